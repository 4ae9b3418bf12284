use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::conflict::{self, ConflictDomain};
use crate::errors::{BookingError, BookingResult};
use crate::lifecycle;
use crate::models::interval::Interval;
use crate::models::reservation::{
    CreateReservationRequest, NewReservation, Reservation, ReservationFilter, ReservationStatus,
    UpdateReservationRequest,
};
use crate::repository::{ReservationRepository, ReservationUnit};
use crate::validation::rules;

use super::decode;

/// Reservation use cases: creation, lifecycle changes and removal.
///
/// Each mutating call opens one unit of work on the repository, so the
/// conflict check and the write it guards are never interleaved with another
/// writer on the same space and date.
#[derive(Clone)]
pub struct ReservationService {
    repo: Arc<dyn ReservationRepository>,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    pub fn new(repo: Arc<dyn ReservationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, payload: Value) -> BookingResult<Reservation> {
        rules::CREATE_RESERVATION.validate(&payload, self.clock.today())?;
        let request: CreateReservationRequest = decode(payload)?;
        let interval = Interval::new(
            request.space_id,
            request.date,
            request.start_time,
            request.end_time,
        )?;

        let mut unit = self.repo.begin().await?;
        ensure_slot_free(unit.as_mut(), &interval, None).await?;

        let reservation = unit
            .insert(NewReservation {
                user_id: request.user_id,
                space_id: request.space_id,
                status: ReservationStatus::Pending,
                total_price: request.total_price,
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                space_service_ids: request
                    .details
                    .iter()
                    .map(|detail| detail.space_service_id)
                    .collect(),
                created_at: self.clock.now(),
            })
            .await?;
        unit.commit().await?;

        info!(
            "Reservation created: id={}, space_id={}, date={}, {}-{}",
            reservation.id,
            reservation.space_id,
            reservation.date,
            reservation.start_time,
            reservation.end_time
        );
        Ok(reservation)
    }

    pub async fn get(&self, id: Uuid) -> BookingResult<Reservation> {
        self.repo.find_by_id(id).await?.ok_or_else(not_found)
    }

    pub async fn list(&self, filter: &ReservationFilter) -> BookingResult<Vec<Reservation>> {
        Ok(self.repo.list(filter).await?)
    }

    /// Partial update of status, date, times and price.
    pub async fn update(&self, id: Uuid, payload: Value) -> BookingResult<Reservation> {
        let mut unit = self.repo.begin().await?;
        let current = unit.find_for_update(id).await?.ok_or_else(not_found)?;

        lifecycle::ensure_not_past(current.date, self.clock.today(), "reservations")?;
        rules::UPDATE_RESERVATION.validate(&payload, self.clock.today())?;
        let request: UpdateReservationRequest = decode(payload)?;
        let plan = lifecycle::plan_update(&current, &request, self.clock.now())?;

        if let Some(candidate) = &plan.candidate {
            ensure_slot_free(unit.as_mut(), candidate, Some(id)).await?;
        }

        let updated = unit.update(id, plan.changes).await?;
        unit.commit().await?;

        if updated.status != current.status {
            info!(
                "Reservation {} moved from {} to {}",
                id, current.status, updated.status
            );
        }
        Ok(updated)
    }

    pub async fn cancel(&self, id: Uuid) -> BookingResult<Reservation> {
        let now = self.clock.now();
        let mut unit = self.repo.begin().await?;
        let current = unit.find_for_update(id).await?.ok_or_else(not_found)?;

        lifecycle::ensure_cancellable(current.status)?;
        lifecycle::ensure_not_past(current.date, now.date_naive(), "reservations")?;

        let cancelled = unit.update(id, lifecycle::cancellation(now)).await?;
        unit.commit().await?;

        info!("Reservation cancelled: id={}", id);
        Ok(cancelled)
    }

    pub async fn delete(&self, id: Uuid) -> BookingResult<()> {
        let mut unit = self.repo.begin().await?;
        let current = unit.find_for_update(id).await?.ok_or_else(not_found)?;

        lifecycle::ensure_not_past(current.date, self.clock.today(), "reservations")?;

        unit.delete(id).await?;
        unit.commit().await?;

        info!("Reservation deleted: id={}", id);
        Ok(())
    }
}

async fn ensure_slot_free(
    unit: &mut dyn ReservationUnit,
    candidate: &Interval,
    excluding: Option<Uuid>,
) -> BookingResult<()> {
    unit.lock_slot(candidate.space_id(), candidate.date()).await?;
    let held = unit
        .find_active_intervals(candidate.space_id(), candidate.date())
        .await?;
    debug!(
        "Checking {} held intervals on space {} for {}",
        held.len(),
        candidate.space_id(),
        candidate.date()
    );

    match conflict::first_conflict(candidate, &held, excluding, ConflictDomain::Reservations) {
        Some(clash) => {
            warn!(
                "Slot unavailable: space_id={}, date={}, {}-{} collides with reservation {}",
                candidate.space_id(),
                candidate.date(),
                candidate.start(),
                candidate.end(),
                clash.owner_id
            );
            Err(BookingError::SlotUnavailable)
        }
        None => Ok(()),
    }
}

fn not_found() -> BookingError {
    BookingError::NotFound("Reservation".to_string())
}
