use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::interval::Interval;

/// A confirmed hold on a space; bookings carry no lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub services: Vec<BookingService>,
}

impl Booking {
    pub fn interval(&self) -> BookingResult<Interval> {
        Interval::new(self.space_id, self.date, self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingService {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub space_service_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_price: i64,
    #[serde(default)]
    pub services: Vec<CreateBookingService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingService {
    pub space_service_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub total_price: Option<i64>,
}

impl UpdateBookingRequest {
    pub fn touches_interval(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub total_price: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub services: Vec<CreateBookingService>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub total_price: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl BookingChanges {
    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(date) = self.date {
            booking.date = date;
        }
        if let Some(start_time) = self.start_time {
            booking.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            booking.end_time = end_time;
        }
        if let Some(total_price) = self.total_price {
            booking.total_price = total_price;
        }
        booking.updated_at = self.updated_at;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub space_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_id.is_none_or(|id| booking.user_id == id)
            && self.space_id.is_none_or(|id| booking.space_id == id)
            && self
                .date_range()
                .is_none_or(|(from, to)| from <= booking.date && booking.date <= to)
    }
}
