use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::interval::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Done,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Rejected,
        ReservationStatus::Cancelled,
        ReservationStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Done => "done",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| eyre::eyre!("Unknown reservation status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub status: ReservationStatus,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Vec<ReservationDetail>,
}

impl Reservation {
    pub fn interval(&self) -> BookingResult<Interval> {
        Interval::new(self.space_id, self.date, self.start_time, self.end_time)
    }
}

/// Space-service add-on attached to a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDetail {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub space_service_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_price: i64,
    #[serde(default)]
    pub details: Vec<CreateReservationDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationDetail {
    pub space_service_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    pub status: Option<ReservationStatus>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub total_price: Option<i64>,
}

impl UpdateReservationRequest {
    pub fn touches_interval(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// Row to insert for a freshly created reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub status: ReservationStatus,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub space_service_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Column changes applied by an update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationChanges {
    pub status: Option<ReservationStatus>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub total_price: Option<i64>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationChanges {
    pub fn apply_to(&self, reservation: &mut Reservation) {
        if let Some(status) = self.status {
            reservation.status = status;
        }
        if let Some(date) = self.date {
            reservation.date = date;
        }
        if let Some(start_time) = self.start_time {
            reservation.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            reservation.end_time = end_time;
        }
        if let Some(total_price) = self.total_price {
            reservation.total_price = total_price;
        }
        if let Some(cancelled_at) = self.cancelled_at {
            reservation.cancelled_at = Some(cancelled_at);
        }
        reservation.updated_at = self.updated_at;
    }
}

/// Query filters for listing reservations.
///
/// The date range only applies when both ends are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationFilter {
    pub user_id: Option<Uuid>,
    pub space_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReservationFilter {
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.user_id.is_none_or(|id| reservation.user_id == id)
            && self.space_id.is_none_or(|id| reservation.space_id == id)
            && self.status.is_none_or(|status| reservation.status == status)
            && self
                .date_range()
                .is_none_or(|(from, to)| from <= reservation.date && reservation.date <= to)
    }
}
