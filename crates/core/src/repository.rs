//! # Repository Interface
//!
//! Storage contract the engine is written against. Every mutation runs inside
//! a unit of work obtained from `begin`: the unit takes the slot lock, reads
//! the intervals already held, writes, and commits. Dropping a unit without
//! calling `commit` discards everything it wrote.

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingChanges, BookingFilter, NewBooking};
use crate::models::interval::ScheduledInterval;
use crate::models::reservation::{
    NewReservation, Reservation, ReservationChanges, ReservationFilter,
};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ReservationUnit>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>>;

    /// Reservations matching `filter`, latest date first.
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>>;
}

#[async_trait]
pub trait ReservationUnit: Send {
    /// Serializes writers on `(space_id, date)` until the unit ends.
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()>;

    /// Loads a reservation and keeps it locked for the rest of the unit.
    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Reservation>>;

    /// Non-cancelled reservations on the space for that date.
    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>>;

    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation>;

    async fn update(&mut self, id: Uuid, changes: ReservationChanges) -> Result<Reservation>;

    /// Removes the reservation together with its details.
    async fn delete(&mut self, id: Uuid) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Bookings matching `filter`, latest date first.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;
}

#[async_trait]
pub trait BookingUnit: Send {
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()>;

    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Booking>>;

    /// Every booking on the space for that date.
    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>>;

    async fn insert(&mut self, booking: NewBooking) -> Result<Booking>;

    async fn update(&mut self, id: Uuid, changes: BookingChanges) -> Result<Booking>;

    /// Removes the booking together with its service lines.
    async fn delete(&mut self, id: Uuid) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
