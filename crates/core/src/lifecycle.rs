//! # Reservation Lifecycle
//!
//! ```text
//! pending ──► confirmed ──► done
//!    │            │
//!    ├──► rejected└──► cancelled
//!    └──────────────► cancelled
//! ```
//!
//! `rejected`, `cancelled` and `done` are terminal.

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{BookingError, BookingResult, FieldErrors};
use crate::models::interval::Interval;
use crate::models::reservation::{
    Reservation, ReservationChanges, ReservationStatus, UpdateReservationRequest,
};

impl ReservationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Rejected | ReservationStatus::Cancelled | ReservationStatus::Done
        )
    }

    /// Active reservations hold their slot against new requests.
    pub fn is_active(self) -> bool {
        self != ReservationStatus::Cancelled
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Done)
        )
    }

    pub fn transition_to(self, next: ReservationStatus) -> BookingResult<ReservationStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BookingError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

/// Checks the dedicated cancel operation against the current status.
pub fn ensure_cancellable(status: ReservationStatus) -> BookingResult<()> {
    match status {
        ReservationStatus::Cancelled => Err(BookingError::AlreadyCancelled),
        ReservationStatus::Done => Err(BookingError::CannotCancelCompleted),
        other => other.transition_to(ReservationStatus::Cancelled).map(|_| ()),
    }
}

/// Refuses mutations on records dated before `today`.
pub fn ensure_not_past(date: NaiveDate, today: NaiveDate, what: &str) -> BookingResult<()> {
    if date < today {
        Err(BookingError::BookingInPast(what.to_string()))
    } else {
        Ok(())
    }
}

/// Outcome of planning an update against the current record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub changes: ReservationChanges,
    /// Interval to conflict-check, present when date or times change
    pub candidate: Option<Interval>,
}

/// Works out what an update request does to `current` without touching storage.
///
/// The caller still has to run the conflict check for `candidate` before
/// applying `changes`.
pub fn plan_update(
    current: &Reservation,
    request: &UpdateReservationRequest,
    now: DateTime<Utc>,
) -> BookingResult<UpdatePlan> {
    ensure_not_past(current.date, now.date_naive(), "reservations")?;

    if request.status == Some(ReservationStatus::Cancelled) {
        ensure_cancellable(current.status)?;
    }

    // Terminal records take no status moves and no field edits.
    if current.status.is_terminal() {
        return Err(match request.status {
            Some(requested) => BookingError::InvalidTransition {
                from: current.status,
                to: requested,
            },
            None => BookingError::ReservationClosed(current.status),
        });
    }

    let next_status = match request.status {
        Some(requested) if requested != current.status => {
            Some(current.status.transition_to(requested)?)
        }
        _ => None,
    };
    let cancelling = next_status == Some(ReservationStatus::Cancelled);

    if cancelling {
        let mut errors = FieldErrors::new();
        for (field, present) in [
            ("date", request.date.is_some()),
            ("start_time", request.start_time.is_some()),
            ("end_time", request.end_time.is_some()),
            ("total_price", request.total_price.is_some()),
        ] {
            if present {
                errors.add(
                    field,
                    format!("The {} field cannot be changed while cancelling.", field),
                );
            }
        }
        errors.into_result()?;
    }

    let candidate = if request.touches_interval() {
        Some(Interval::new(
            current.space_id,
            request.date.unwrap_or(current.date),
            request.start_time.unwrap_or(current.start_time),
            request.end_time.unwrap_or(current.end_time),
        )?)
    } else {
        None
    };

    Ok(UpdatePlan {
        changes: ReservationChanges {
            status: next_status,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            total_price: request.total_price,
            cancelled_at: cancelling.then_some(now),
            updated_at: now,
        },
        candidate,
    })
}

/// Changes written by the cancel operation.
pub fn cancellation(now: DateTime<Utc>) -> ReservationChanges {
    ReservationChanges {
        status: Some(ReservationStatus::Cancelled),
        cancelled_at: Some(now),
        updated_at: now,
        ..ReservationChanges::default()
    }
}
