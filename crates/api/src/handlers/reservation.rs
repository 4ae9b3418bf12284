use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use waqitly_core::models::reservation::{Reservation, ReservationFilter};

use crate::{
    middleware::{
        error_handling::AppError,
        extract::{JsonBody, QueryFilter, Reservations, ResourceId},
    },
    response::{Envelope, Reply},
    ApiState,
};

type ReservationId = ResourceId<Reservations>;

#[axum::debug_handler]
pub async fn list_reservations(
    State(state): State<Arc<ApiState>>,
    QueryFilter(filter): QueryFilter<ReservationFilter>,
) -> Result<Reply<Vec<Reservation>>, AppError> {
    let reservations = state.reservations.list(&filter).await?;
    Ok(Reply::ok(reservations, "Reservations retrieved successfully"))
}

#[axum::debug_handler]
pub async fn create_reservation(
    State(state): State<Arc<ApiState>>,
    JsonBody(payload): JsonBody,
) -> Result<Reply<Reservation>, AppError> {
    let reservation = state.reservations.create(payload).await?;
    Ok(Reply::created(reservation, "Reservation created successfully"))
}

#[axum::debug_handler]
pub async fn get_reservation(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ReservationId,
) -> Result<Reply<Reservation>, AppError> {
    let reservation = state.reservations.get(id).await?;
    Ok(Reply::ok(reservation, "Reservation retrieved successfully"))
}

#[axum::debug_handler]
pub async fn update_reservation(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ReservationId,
    JsonBody(payload): JsonBody,
) -> Result<Reply<Reservation>, AppError> {
    let reservation = state.reservations.update(id, payload).await?;
    Ok(Reply::ok(reservation, "Reservation updated successfully"))
}

#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ReservationId,
) -> Result<Reply<Reservation>, AppError> {
    let reservation = state.reservations.cancel(id).await?;
    Ok(Reply::ok(reservation, "Reservation cancelled successfully"))
}

#[axum::debug_handler]
pub async fn delete_reservation(
    State(state): State<Arc<ApiState>>,
    ResourceId(id, ..): ReservationId,
) -> Result<Reply<()>, AppError> {
    state.reservations.delete(id).await?;
    Ok(Reply(
        StatusCode::OK,
        Envelope::message("Reservation deleted successfully"),
    ))
}
