//! # Conflict Detection
//!
//! Decides whether a candidate interval collides with intervals already held
//! on the same space and date.
//!
//! Reservations and bookings are checked as two independent domains: a
//! booking never blocks a reservation and the reverse. Cancelled reservations
//! release their slot; bookings have no status and always hold theirs.

use uuid::Uuid;

use crate::models::interval::{Interval, ScheduledInterval};
use crate::models::reservation::ReservationStatus;

/// Which set of existing intervals a candidate is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDomain {
    Reservations,
    Bookings,
}

impl ConflictDomain {
    /// Whether an existing interval with this status still holds its slot.
    pub fn participates(self, status: Option<ReservationStatus>) -> bool {
        match self {
            ConflictDomain::Reservations => status.is_none_or(ReservationStatus::is_active),
            ConflictDomain::Bookings => true,
        }
    }

    /// Prefix used to key slot locks so the two domains never contend.
    pub fn lock_namespace(self) -> &'static str {
        match self {
            ConflictDomain::Reservations => "reservations",
            ConflictDomain::Bookings => "bookings",
        }
    }
}

/// Returns `true` when `candidate` overlaps any participating interval in
/// `existing`, ignoring the one owned by `excluding`.
pub fn has_conflict(
    candidate: &Interval,
    existing: &[ScheduledInterval],
    excluding: Option<Uuid>,
    domain: ConflictDomain,
) -> bool {
    first_conflict(candidate, existing, excluding, domain).is_some()
}

/// Like [`has_conflict`], returning the first interval in the way.
pub fn first_conflict<'a>(
    candidate: &Interval,
    existing: &'a [ScheduledInterval],
    excluding: Option<Uuid>,
    domain: ConflictDomain,
) -> Option<&'a ScheduledInterval> {
    existing.iter().find(|held| {
        Some(held.owner_id) != excluding
            && domain.participates(held.status)
            && candidate.overlaps(&held.interval)
    })
}
