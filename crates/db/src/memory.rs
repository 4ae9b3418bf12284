//! In-process repositories.
//!
//! Each store sits behind one async mutex. A unit of work holds the lock from
//! `begin` until it is committed or dropped and writes into a staged copy, so
//! an uncommitted unit leaves the store untouched. This makes every unit
//! fully serialized, which is coarser than the per-slot locking the Postgres
//! repositories do but gives the same guarantees.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{eyre, Result};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;
use waqitly_core::models::booking::{
    Booking, BookingChanges, BookingFilter, BookingService, NewBooking,
};
use waqitly_core::models::interval::ScheduledInterval;
use waqitly_core::models::reservation::{
    NewReservation, Reservation, ReservationChanges, ReservationDetail, ReservationFilter,
};
use waqitly_core::repository::{
    BookingRepository, BookingUnit, ReservationRepository, ReservationUnit,
};

type Table<T> = HashMap<Uuid, T>;

struct MemoryUnit<T> {
    guard: OwnedMutexGuard<Table<T>>,
    staged: Table<T>,
}

impl<T: Clone> MemoryUnit<T> {
    async fn open(table: &Arc<Mutex<Table<T>>>) -> Self {
        let guard = table.clone().lock_owned().await;
        let staged = guard.clone();
        Self { guard, staged }
    }

    fn locked(&self, id: Uuid) -> Option<T> {
        self.staged.get(&id).cloned()
    }

    fn publish(mut self) {
        *self.guard = self.staged;
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReservations {
    rows: Arc<Mutex<Table<Reservation>>>,
}

impl InMemoryReservations {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservations {
    async fn begin(&self) -> Result<Box<dyn ReservationUnit>> {
        Ok(Box::new(MemoryUnit::open(&self.rows).await))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        let rows = self.rows.lock().await;
        let mut found: Vec<Reservation> = rows
            .values()
            .filter(|reservation| filter.matches(reservation))
            .cloned()
            .collect();
        found.sort_by_key(|r| Reverse((r.date, r.start_time)));
        Ok(found)
    }
}

#[async_trait]
impl ReservationUnit for MemoryUnit<Reservation> {
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()> {
        // The store lock taken in `begin` already covers every slot.
        tracing::trace!("Slot {}:{} covered by store lock", space_id, date);
        Ok(())
    }

    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Reservation>> {
        Ok(self.locked(id))
    }

    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>> {
        self.staged
            .values()
            .filter(|r| r.space_id == space_id && r.date == date && r.status.is_active())
            .map(|r| -> Result<ScheduledInterval> {
                Ok(ScheduledInterval {
                    owner_id: r.id,
                    interval: r.interval()?,
                    status: Some(r.status),
                })
            })
            .collect()
    }

    async fn insert(&mut self, reservation: NewReservation) -> Result<Reservation> {
        let id = Uuid::new_v4();
        let details = reservation
            .space_service_ids
            .into_iter()
            .map(|space_service_id| ReservationDetail {
                id: Uuid::new_v4(),
                reservation_id: id,
                space_service_id,
            })
            .collect();

        let created = Reservation {
            id,
            user_id: reservation.user_id,
            space_id: reservation.space_id,
            status: reservation.status,
            total_price: reservation.total_price,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            created_at: reservation.created_at,
            updated_at: reservation.created_at,
            cancelled_at: None,
            details,
        };
        self.staged.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&mut self, id: Uuid, changes: ReservationChanges) -> Result<Reservation> {
        let reservation = self
            .staged
            .get_mut(&id)
            .ok_or_else(|| eyre!("Reservation {} vanished during update", id))?;
        changes.apply_to(reservation);
        Ok(reservation.clone())
    }

    async fn delete(&mut self, id: Uuid) -> Result<()> {
        self.staged
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| eyre!("No reservation record has been deleted"))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.publish();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBookings {
    rows: Arc<Mutex<Table<Booking>>>,
}

impl InMemoryBookings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>> {
        Ok(Box::new(MemoryUnit::open(&self.rows).await))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let rows = self.rows.lock().await;
        let mut found: Vec<Booking> = rows
            .values()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect();
        found.sort_by_key(|b| Reverse((b.date, b.start_time)));
        Ok(found)
    }
}

#[async_trait]
impl BookingUnit for MemoryUnit<Booking> {
    async fn lock_slot(&mut self, space_id: Uuid, date: NaiveDate) -> Result<()> {
        tracing::trace!("Slot {}:{} covered by store lock", space_id, date);
        Ok(())
    }

    async fn find_for_update(&mut self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.locked(id))
    }

    async fn find_active_intervals(
        &mut self,
        space_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduledInterval>> {
        self.staged
            .values()
            .filter(|b| b.space_id == space_id && b.date == date)
            .map(|b| -> Result<ScheduledInterval> {
                Ok(ScheduledInterval {
                    owner_id: b.id,
                    interval: b.interval()?,
                    status: None,
                })
            })
            .collect()
    }

    async fn insert(&mut self, booking: NewBooking) -> Result<Booking> {
        let id = Uuid::new_v4();
        let services = booking
            .services
            .into_iter()
            .map(|line| BookingService {
                id: Uuid::new_v4(),
                booking_id: id,
                space_service_id: line.space_service_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        let created = Booking {
            id,
            user_id: booking.user_id,
            space_id: booking.space_id,
            total_price: booking.total_price,
            date: booking.date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            created_at: booking.created_at,
            updated_at: booking.created_at,
            services,
        };
        self.staged.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&mut self, id: Uuid, changes: BookingChanges) -> Result<Booking> {
        let booking = self
            .staged
            .get_mut(&id)
            .ok_or_else(|| eyre!("Booking {} vanished during update", id))?;
        changes.apply_to(booking);
        Ok(booking.clone())
    }

    async fn delete(&mut self, id: Uuid) -> Result<()> {
        self.staged
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| eyre!("No booking record has been deleted"))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.publish();
        Ok(())
    }
}
