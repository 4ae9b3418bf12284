use axum::{body::to_bytes, http::StatusCode, response::Response};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use waqitly_api::middleware::error_handling::{map_error, AppError};
use waqitly_core::errors::{BookingError, FieldErrors};
use waqitly_core::models::reservation::ReservationStatus;

async fn body_of(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case::not_found(BookingError::NotFound("Reservation".into()), StatusCode::NOT_FOUND)]
#[case::validation(
    BookingError::ValidationFailed(FieldErrors::single("date", "bad")),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case::slot(BookingError::SlotUnavailable, StatusCode::UNPROCESSABLE_ENTITY)]
#[case::transition(
    BookingError::InvalidTransition {
        from: ReservationStatus::Done,
        to: ReservationStatus::Pending,
    },
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case::already_cancelled(BookingError::AlreadyCancelled, StatusCode::UNPROCESSABLE_ENTITY)]
#[case::completed(BookingError::CannotCancelCompleted, StatusCode::UNPROCESSABLE_ENTITY)]
#[case::closed(
    BookingError::ReservationClosed(ReservationStatus::Done),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case::past(
    BookingError::BookingInPast("bookings".into()),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case::unexpected(
    BookingError::Unexpected(eyre::eyre!("disk full")),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[tokio::test]
async fn test_validation_failure_carries_field_errors() {
    let mut errors = FieldErrors::new();
    errors.add("start_time", "The start_time field is required.");
    errors.add("total_price", "The total_price field must be at least 0.");

    let response = map_error(BookingError::ValidationFailed(errors));

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_of(response).await,
        json!({
            "success": false,
            "message": "Validation failed",
            "errors": {
                "start_time": ["The start_time field is required."],
                "total_price": ["The total_price field must be at least 0."]
            }
        })
    );
}

#[tokio::test]
async fn test_domain_error_has_message_without_field_errors() {
    let response = map_error(BookingError::SlotUnavailable);

    assert_eq!(
        body_of(response).await,
        json!({
            "success": false,
            "message": "Space is not available at the requested time"
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_unexpected_error_hides_details() {
    let response = map_error(BookingError::from(eyre::eyre!("password authentication failed")));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_of(response).await;
    assert_eq!(body["message"], json!("Internal server error"));
    assert!(!body.to_string().contains("password"));
}
