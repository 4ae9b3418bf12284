pub mod booking;
pub mod reservation;

pub use booking::BookingService;
pub use reservation::ReservationService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{BookingError, BookingResult, FieldErrors};

/// Turns an already validated payload into its typed request.
fn decode<T: DeserializeOwned>(payload: Value) -> BookingResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| BookingError::ValidationFailed(FieldErrors::single("body", e.to_string())))
}
