use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{eyre, Result};
use sqlx::{PgConnection, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;
use waqitly_core::conflict::ConflictDomain;
use waqitly_core::models::interval::ScheduledInterval;
use waqitly_core::models::reservation::{
    NewReservation, Reservation, ReservationChanges, ReservationDetail, ReservationFilter,
    ReservationStatus,
};
use waqitly_core::repository::{ReservationRepository, ReservationUnit};

use crate::models::{DbReservation, DbReservationDetail};
use crate::DbPool;

#[derive(Clone)]
pub struct PgReservationRepository {
    pool: DbPool,
}

impl PgReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn begin(&self) -> Result<Box<dyn ReservationUnit>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgReservationUnit { tx }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>> {
        tracing::debug!("Getting reservation by id: {}", id);
        let mut conn = self.pool.acquire().await?;
        load_reservation(&mut conn, id, false).await
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, user_id, space_id, status, total_price, date, start_time, end_time,
                   created_at, updated_at, cancelled_at
            FROM reservations
            WHERE TRUE
            "#,
        );
        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(space_id) = filter.space_id {
            query.push(" AND space_id = ").push_bind(space_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some((from, to)) = filter.date_range() {
            query
                .push(" AND date BETWEEN ")
                .push_bind(from)
                .push(" AND ")
                .push_bind(to);
        }
        query.push(" ORDER BY date DESC, start_time DESC");

        let mut conn = self.pool.acquire().await?;
        let rows = query
            .build_query_as::<DbReservation>()
            .fetch_all(&mut *conn)
            .await?;
        tracing::debug!("Listed {} reservations", rows.len());

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut details: HashMap<Uuid, Vec<ReservationDetail>> = HashMap::new();
        for detail in load_details(&mut conn, &ids).await? {
            details
                .entry(detail.reservation_id)
                .or_default()
                .push(detail.into());
        }

        rows.into_iter()
            .map(|row| {
                let own = details.remove(&row.id).unwrap_or_default();
                row.into_domain(own)
            })
            .collect()
    }
}

/// One transaction; rolled back by sqlx when dropped uncommitted.
pub struct PgReservationUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReservationUnit for PgReservationUnit {
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()> {
        super::lock_slot(&mut self.tx, ConflictDomain::Reservations, space_id, date).await
    }

    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Reservation>> {
        load_reservation(&mut self.tx, id, true).await
    }

    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>> {
        let rows = sqlx::query_as::<_, DbReservation>(
            r#"
            SELECT id, user_id, space_id, status, total_price, date, start_time, end_time,
                   created_at, updated_at, cancelled_at
            FROM reservations
            WHERE space_id = $1 AND date = $2 AND status <> $3
            "#,
        )
        .bind(space_id)
        .bind(date)
        .bind(ReservationStatus::Cancelled.as_str())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(DbReservation::scheduled).collect()
    }

    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation> {
        let id = Uuid::new_v4();

        tracing::debug!(
            "Creating reservation: id={}, space_id={}, date={}",
            id,
            reservation.space_id,
            reservation.date
        );

        let row = sqlx::query_as::<_, DbReservation>(
            r#"
            INSERT INTO reservations
                (id, user_id, space_id, status, total_price, date, start_time, end_time,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id, user_id, space_id, status, total_price, date, start_time, end_time,
                      created_at, updated_at, cancelled_at
            "#,
        )
        .bind(id)
        .bind(reservation.user_id)
        .bind(reservation.space_id)
        .bind(reservation.status.as_str())
        .bind(reservation.total_price)
        .bind(reservation.date)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        let mut details = Vec::with_capacity(reservation.space_service_ids.len());
        for space_service_id in reservation.space_service_ids {
            let detail = sqlx::query_as::<_, DbReservationDetail>(
                r#"
                INSERT INTO reservation_details (id, reservation_id, space_service_id)
                VALUES ($1, $2, $3)
                RETURNING id, reservation_id, space_service_id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(space_service_id)
            .fetch_one(&mut *self.tx)
            .await?;
            details.push(detail.into());
        }

        row.into_domain(details)
    }

    async fn update(&mut self, id: Uuid, changes: ReservationChanges) -> Result<Reservation> {
        let row = sqlx::query_as::<_, DbReservation>(
            r#"
            UPDATE reservations
            SET status = COALESCE($2, status),
                date = COALESCE($3, date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                total_price = COALESCE($6, total_price),
                cancelled_at = COALESCE($7, cancelled_at),
                updated_at = $8
            WHERE id = $1
            RETURNING id, user_id, space_id, status, total_price, date, start_time, end_time,
                      created_at, updated_at, cancelled_at
            "#,
        )
        .bind(id)
        .bind(changes.status.map(ReservationStatus::as_str))
        .bind(changes.date)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.total_price)
        .bind(changes.cancelled_at)
        .bind(changes.updated_at)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| eyre!("Reservation {} vanished during update", id))?;

        let details = load_details(&mut self.tx, &[id]).await?;
        row.into_domain(details.into_iter().map(Into::into).collect())
    }

    async fn delete(&mut self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM reservation_details WHERE reservation_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() < 1 {
            return Err(eyre!("No reservation record has been deleted"));
        }

        tracing::debug!("Reservation deleted: id={}", id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn load_reservation(
    conn: &mut PgConnection,
    id: Uuid,
    for_update: bool,
) -> Result<Option<Reservation>> {
    let sql = if for_update {
        r#"
        SELECT id, user_id, space_id, status, total_price, date, start_time, end_time,
               created_at, updated_at, cancelled_at
        FROM reservations
        WHERE id = $1
        FOR UPDATE
        "#
    } else {
        r#"
        SELECT id, user_id, space_id, status, total_price, date, start_time, end_time,
               created_at, updated_at, cancelled_at
        FROM reservations
        WHERE id = $1
        "#
    };

    let Some(row) = sqlx::query_as::<_, DbReservation>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        tracing::debug!("Reservation not found: id={}", id);
        return Ok(None);
    };

    let details = load_details(conn, &[id]).await?;
    row.into_domain(details.into_iter().map(Into::into).collect())
        .map(Some)
}

async fn load_details(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<DbReservationDetail>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let details = sqlx::query_as::<_, DbReservationDetail>(
        r#"
        SELECT id, reservation_id, space_service_id
        FROM reservation_details
        WHERE reservation_id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    Ok(details)
}
