use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use waqitly_core::models::booking::{Booking, BookingService};
use waqitly_core::models::interval::{Interval, ScheduledInterval};
use waqitly_core::models::reservation::{Reservation, ReservationDetail, ReservationStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub status: String,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl DbReservation {
    pub fn into_domain(self, details: Vec<ReservationDetail>) -> Result<Reservation> {
        Ok(Reservation {
            id: self.id,
            user_id: self.user_id,
            space_id: self.space_id,
            status: self.status.parse()?,
            total_price: self.total_price,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
            cancelled_at: self.cancelled_at,
            details,
        })
    }

    pub fn scheduled(&self) -> Result<ScheduledInterval> {
        let status: ReservationStatus = self.status.parse()?;
        Ok(ScheduledInterval {
            owner_id: self.id,
            interval: Interval::new(self.space_id, self.date, self.start_time, self.end_time)
                .map_err(|e| eyre::eyre!("Stored reservation {} is malformed: {}", self.id, e))?,
            status: Some(status),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservationDetail {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub space_service_id: Uuid,
}

impl From<DbReservationDetail> for ReservationDetail {
    fn from(row: DbReservationDetail) -> Self {
        Self {
            id: row.id,
            reservation_id: row.reservation_id,
            space_service_id: row.space_service_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBooking {
    pub fn into_domain(self, services: Vec<BookingService>) -> Booking {
        Booking {
            id: self.id,
            user_id: self.user_id,
            space_id: self.space_id,
            total_price: self.total_price,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
            services,
        }
    }

    pub fn scheduled(&self) -> Result<ScheduledInterval> {
        Ok(ScheduledInterval {
            owner_id: self.id,
            interval: Interval::new(self.space_id, self.date, self.start_time, self.end_time)
                .map_err(|e| eyre::eyre!("Stored booking {} is malformed: {}", self.id, e))?,
            status: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingService {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub space_service_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

impl From<DbBookingService> for BookingService {
    fn from(row: DbBookingService) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            space_service_id: row.space_service_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}
