use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{eyre, Result};
use sqlx::{PgConnection, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;
use waqitly_core::conflict::ConflictDomain;
use waqitly_core::models::booking::{
    Booking, BookingChanges, BookingFilter, BookingService, NewBooking,
};
use waqitly_core::models::interval::ScheduledInterval;
use waqitly_core::repository::{BookingRepository, BookingUnit};

use crate::models::{DbBooking, DbBookingService};
use crate::DbPool;

#[derive(Clone)]
pub struct PgBookingRepository {
    pool: DbPool,
}

impl PgBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBookingUnit { tx }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        tracing::debug!("Getting booking by id: {}", id);
        let mut conn = self.pool.acquire().await?;
        load_booking(&mut conn, id, false).await
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT id, user_id, space_id, total_price, date, start_time, end_time,
                   created_at, updated_at
            FROM bookings
            WHERE TRUE
            "#,
        );
        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(space_id) = filter.space_id {
            query.push(" AND space_id = ").push_bind(space_id);
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
            .build_query_as::<DbBooking>()
            .fetch_all(&mut *conn)
            .await?;
        tracing::debug!("Listed {} bookings", rows.len());

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut services = group_services(load_services(&mut conn, &ids).await?);

        Ok(rows
            .into_iter()
            .map(|row| {
                let own = services.remove(&row.id).unwrap_or_default();
                row.into_domain(own)
            })
            .collect())
    }
}

pub struct PgBookingUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingUnit for PgBookingUnit {
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()> {
        super::lock_slot(&mut self.tx, ConflictDomain::Bookings, space_id, date).await
    }

    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Booking>> {
        load_booking(&mut self.tx, id, true).await
    }

    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>> {
        let rows = sqlx::query_as::<_, DbBooking>(
            r#"
            SELECT id, user_id, space_id, total_price, date, start_time, end_time,
                   created_at, updated_at
            FROM bookings
            WHERE space_id = $1 AND date = $2
            "#,
        )
        .bind(space_id)
        .bind(date)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(DbBooking::scheduled).collect()
    }

    async fn insert(&mut self, booking: NewBooking) -> Result<Booking> {
        let id = Uuid::new_v4();

        tracing::debug!(
            "Creating booking: id={}, space_id={}, date={}, services={}",
            id,
            booking.space_id,
            booking.date,
            booking.services.len()
        );

        let row = sqlx::query_as::<_, DbBooking>(
            r#"
            INSERT INTO bookings
                (id, user_id, space_id, total_price, date, start_time, end_time,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id, user_id, space_id, total_price, date, start_time, end_time,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(booking.user_id)
        .bind(booking.space_id)
        .bind(booking.total_price)
        .bind(booking.date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        let mut services = Vec::with_capacity(booking.services.len());
        for line in booking.services {
            let service = sqlx::query_as::<_, DbBookingService>(
                r#"
                INSERT INTO booking_services (id, booking_id, space_service_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, booking_id, space_service_id, quantity, price
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(line.space_service_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *self.tx)
            .await?;
            services.push(service.into());
        }

        Ok(row.into_domain(services))
    }

    async fn update(&mut self, id: Uuid, changes: BookingChanges) -> Result<Booking> {
        let row = sqlx::query_as::<_, DbBooking>(
            r#"
            UPDATE bookings
            SET date = COALESCE($2, date),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                total_price = COALESCE($5, total_price),
                updated_at = $6
            WHERE id = $1
            RETURNING id, user_id, space_id, total_price, date, start_time, end_time,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.date)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.total_price)
        .bind(changes.updated_at)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| eyre!("Booking {} vanished during update", id))?;

        let services = load_services(&mut self.tx, &[id]).await?;
        Ok(row.into_domain(services.into_iter().map(Into::into).collect()))
    }

    async fn delete(&mut self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM booking_services WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() < 1 {
            return Err(eyre!("No booking record has been deleted"));
        }

        tracing::debug!("Booking deleted: id={}", id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn load_booking(
    conn: &mut PgConnection,
    id: Uuid,
    for_update: bool,
) -> Result<Option<Booking>> {
    let sql = if for_update {
        r#"
        SELECT id, user_id, space_id, total_price, date, start_time, end_time,
               created_at, updated_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#
    } else {
        r#"
        SELECT id, user_id, space_id, total_price, date, start_time, end_time,
               created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#
    };

    let row = sqlx::query_as::<_, DbBooking>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let services = load_services(conn, &[id]).await?;
            Ok(Some(row.into_domain(services.into_iter().map(Into::into).collect())))
        }
        None => {
            tracing::debug!("Booking not found: id={}", id);
            Ok(None)
        }
    }
}

async fn load_services(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<DbBookingService>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let services = sqlx::query_as::<_, DbBookingService>(
        r#"
        SELECT id, booking_id, space_service_id, quantity, price
        FROM booking_services
        WHERE booking_id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    Ok(services)
}

fn group_services(rows: Vec<DbBookingService>) -> HashMap<Uuid, Vec<BookingService>> {
    let mut grouped: HashMap<Uuid, Vec<BookingService>> = HashMap::new();
    for row in rows {
        grouped.entry(row.booking_id).or_default().push(row.into());
    }
    grouped
}
