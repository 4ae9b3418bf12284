use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::models::reservation::ReservationStatus;

/// Field name to messages, in the order the rules reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected, otherwise a `ValidationFailed` error.
    pub fn into_result(self) -> BookingResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BookingError::ValidationFailed(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation failed")]
    ValidationFailed(FieldErrors),

    #[error("Invalid interval: start {start} must be before end {end}")]
    InvalidInterval { start: String, end: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Space is not available at the requested time")]
    SlotUnavailable,

    #[error("Cannot change reservation status from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Reservation is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel completed reservation")]
    CannotCancelCompleted,

    #[error("Cannot modify {0} reservation")]
    ReservationClosed(ReservationStatus),

    #[error("Cannot modify past {0}")]
    BookingInPast(String),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl BookingError {
    /// Field-level messages carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            BookingError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
