use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use waqitly_core::models::booking::{Booking, BookingFilter};

use crate::{
    middleware::{
        error_handling::AppError,
        extract::{Bookings, JsonBody, QueryFilter, ResourceId},
    },
    response::{Envelope, Reply},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    QueryFilter(filter): QueryFilter<BookingFilter>,
) -> Result<Reply<Vec<Booking>>, AppError> {
    let bookings = state.bookings.list(&filter).await?;
    Ok(Reply::ok(bookings, "Bookings retrieved successfully"))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody,
) -> Result<Reply<Booking>, AppError> {
    let booking = state.bookings.create(payload).await?;
    Ok(Reply::created(booking, "Booking created successfully"))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ResourceId<Bookings>,
) -> Result<Reply<Booking>, AppError> {
    let booking = state.bookings.get(id).await?;
    Ok(Reply::ok(booking, "Booking retrieved successfully"))
}

#[axum::debug_handler]
pub async fn update_booking(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ResourceId<Bookings>,
    JsonBody(payload): JsonBody,
) -> Result<Reply<Booking>, AppError> {
    let booking = state.bookings.update(id, payload).await?;
    Ok(Reply::ok(booking, "Booking updated successfully"))
}

#[axum::debug_handler]
pub async fn delete_booking(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ResourceId<Bookings>,
) -> Result<Reply<()>, AppError> {
    state.bookings.delete(id).await?;
    Ok(Reply(StatusCode::OK, Envelope::message("Booking deleted successfully")))
}
