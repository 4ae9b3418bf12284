use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::reservation::ReservationStatus;

/// Occupancy of one space on one calendar date.
///
/// Both ends are compared inclusively, so two intervals that only touch at a
/// boundary still overlap. An interval never spans midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    space_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

impl Interval {
    pub fn new(
        space_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> BookingResult<Self> {
        if start >= end {
            return Err(BookingError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            space_id,
            date,
            start,
            end,
        })
    }

    pub fn space_id(&self) -> Uuid {
        self.space_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether both intervals occupy the same space on the same date.
    pub fn shares_slot_day(&self, other: &Interval) -> bool {
        self.space_id == other.space_id && self.date == other.date
    }

    fn contains_instant(&self, instant: NaiveTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Overlap test used by the conflict detector, with `self` as the candidate.
    ///
    /// The three branches are kept in the shape the booking queries have always
    /// used: the other interval starts inside this one, ends inside this one,
    /// or encloses it.
    pub fn overlaps(&self, other: &Interval) -> bool {
        if !self.shares_slot_day(other) {
            return false;
        }

        self.contains_instant(other.start)
            || self.contains_instant(other.end)
            || (other.start <= self.start && other.end >= self.end)
    }
}

/// An interval already held by a reservation or booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInterval {
    /// Id of the reservation or booking occupying the interval
    pub owner_id: Uuid,
    pub interval: Interval,
    /// `None` for bookings, which carry no status
    pub status: Option<ReservationStatus>,
}
