use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::conflict::{self, ConflictDomain};
use crate::errors::{BookingError, BookingResult};
use crate::lifecycle::ensure_not_past;
use crate::models::booking::{
    Booking, BookingChanges, BookingFilter, CreateBookingRequest, NewBooking,
    UpdateBookingRequest,
};
use crate::models::interval::Interval;
use crate::repository::{BookingRepository, BookingUnit};
use crate::validation::rules;

use super::decode;

/// Booking use cases. Bookings have no status, so the only guarded
/// mutations are interval changes and removal.
#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, payload: Value) -> BookingResult<Booking> {
        rules::CREATE_BOOKING.validate(&payload, self.clock.today())?;
        let request: CreateBookingRequest = decode(payload)?;
        let interval = Interval::new(
            request.space_id,
            request.date,
            request.start_time,
            request.end_time,
        )?;

        let mut unit = self.repo.begin().await?;
        ensure_slot_free(unit.as_mut(), &interval, None).await?;

        let booking = unit
            .insert(NewBooking {
                user_id: request.user_id,
                space_id: request.space_id,
                total_price: request.total_price,
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                services: request.services,
                created_at: self.clock.now(),
            })
            .await?;
        unit.commit().await?;

        info!(
            "Booking created: id={}, space_id={}, date={}, {}-{}",
            booking.id, booking.space_id, booking.date, booking.start_time, booking.end_time
        );
        Ok(booking)
    }

    pub async fn get(&self, id: Uuid) -> BookingResult<Booking> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    pub async fn list(&self, filter: &BookingFilter) -> BookingResult<Vec<Booking>> {
        Ok(self.repo.list(filter).await?)
    }

    pub async fn update(&self, id: Uuid, payload: Value) -> BookingResult<Booking> {
        let now = self.clock.now();
        let mut unit = self.repo.begin().await?;
        let current = unit.find_for_update(id).await?.ok_or_else(not_found)?;

        ensure_not_past(current.date, now.date_naive(), "bookings")?;

        rules::UPDATE_BOOKING.validate(&payload, now.date_naive())?;
        let request: UpdateBookingRequest = decode(payload)?;

        if request.touches_interval() {
            let candidate = Interval::new(
                current.space_id,
                request.date.unwrap_or(current.date),
                request.start_time.unwrap_or(current.start_time),
                request.end_time.unwrap_or(current.end_time),
            )?;
            ensure_slot_free(unit.as_mut(), &candidate, Some(id)).await?;
        }

        let updated = unit
            .update(
                id,
                BookingChanges {
                    date: request.date,
                    start_time: request.start_time,
                    end_time: request.end_time,
                    total_price: request.total_price,
                    updated_at: now,
                },
            )
            .await?;
        unit.commit().await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> BookingResult<()> {
        let mut unit = self.repo.begin().await?;
        let current = unit.find_for_update(id).await?.ok_or_else(not_found)?;

        ensure_not_past(current.date, self.clock.today(), "bookings")?;

        unit.delete(id).await?;
        unit.commit().await?;

        info!("Booking deleted: id={}", id);
        Ok(())
    }
}

async fn ensure_slot_free(
    unit: &mut dyn BookingUnit,
    candidate: &Interval,
    excluding: Option<Uuid>,
) -> BookingResult<()> {
    unit.lock_slot(candidate.space_id(), candidate.date()).await?;
    let held = unit
        .find_active_intervals(candidate.space_id(), candidate.date())
        .await?;

    if let Some(clash) =
        conflict::first_conflict(candidate, &held, excluding, ConflictDomain::Bookings)
    {
        warn!(
            "Slot unavailable: space_id={}, date={} collides with booking {}",
            candidate.space_id(),
            candidate.date(),
            clash.owner_id
        );
        return Err(BookingError::SlotUnavailable);
    }

    Ok(())
}

fn not_found() -> BookingError {
    BookingError::NotFound("Booking".to_string())
}
