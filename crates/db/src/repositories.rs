pub mod booking;
pub mod reservation;

pub use booking::PgBookingRepository;
pub use reservation::PgReservationRepository;

use chrono::NaiveDate;
use eyre::Result;
use sqlx::PgConnection;
use uuid::Uuid;
use waqitly_core::conflict::ConflictDomain;

/// Takes a transaction-scoped advisory lock on one space and date.
///
/// The lock is released by Postgres when the surrounding transaction commits
/// or rolls back, so it needs no explicit unlock.
pub(crate) async fn lock_slot(
    conn: &mut PgConnection,
    domain: ConflictDomain,
    space_id: Uuid,
    date: NaiveDate,
) -> Result<()> {
    let key = format!("{}:{}:{}", domain.lock_namespace(), space_id, date);
    tracing::debug!("Acquiring slot lock: {}", key);

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(&key)
        .execute(conn)
        .await?;

    Ok(())
}
