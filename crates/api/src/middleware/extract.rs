//! Request extractors whose rejections speak the API's error envelope.

use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;
use waqitly_core::errors::{BookingError, FieldErrors};

use super::error_handling::AppError;

/// Names the resource a path id points at, for the 404 message.
pub trait Resource: Send + Sync + 'static {
    const NAME: &'static str;
}

pub struct Reservations;

impl Resource for Reservations {
    const NAME: &'static str = "Reservation";
}

pub struct Bookings;

impl Resource for Bookings {
    const NAME: &'static str = "Booking";
}

/// The `:id` path segment. An id that is not a UUID cannot name an existing
/// record, so it is reported as not found.
pub struct ResourceId<R>(pub Uuid, pub PhantomData<fn() -> R>);

impl<R> ResourceId<R> {
    pub fn new(id: Uuid) -> Self {
        Self(id, PhantomData)
    }
}

#[async_trait]
impl<S, R> FromRequestParts<S> for ResourceId<R>
where
    S: Send + Sync,
    R: Resource,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let not_found = || AppError(BookingError::NotFound(R::NAME.to_string()));

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;

        Uuid::parse_str(&raw)
            .map(ResourceId::new)
            .map_err(|_| not_found())
    }
}

/// A JSON object body, left untyped so field rules can report every problem
/// at once. Malformed JSON is a validation failure on `body`.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError(BookingError::ValidationFailed(FieldErrors::single(
                    "body",
                    rejection.body_text(),
                )))
            })?;

        Ok(JsonBody(value))
    }
}

/// Query-string filters. Values that do not parse are a validation failure
/// on `query`.
pub struct QueryFilter<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryFilter<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(filter) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError(BookingError::ValidationFailed(FieldErrors::single(
                    "query",
                    rejection.body_text(),
                )))
            })?;

        Ok(QueryFilter(filter))
    }
}
