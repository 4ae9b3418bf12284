//! # Error Handling Middleware
//!
//! Maps [`BookingError`] values to HTTP status codes and the failure
//! envelope, so every handler reports errors the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use waqitly_core::errors::BookingError;

use crate::response::Envelope;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use waqitly_api::middleware::error_handling::AppError;
/// use waqitly_core::errors::BookingError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(BookingError::NotFound("Reservation".into())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::ValidationFailed(_)
            | BookingError::InvalidInterval { .. }
            | BookingError::SlotUnavailable
            | BookingError::InvalidTransition { .. }
            | BookingError::AlreadyCancelled
            | BookingError::CannotCancelCompleted
            | BookingError::ReservationClosed(_)
            | BookingError::BookingInPast(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.0 {
            BookingError::Unexpected(report) => {
                error!("Unexpected error: {:?}", report);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let errors = match self.0 {
            BookingError::ValidationFailed(errors) => Some(errors),
            _ => None,
        };

        (status, Json(Envelope::failure(message, errors))).into_response()
    }
}

/// Allows `?` on service calls inside handlers.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Unexpected(err))
    }
}

/// Maps a BookingError to an HTTP response
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
