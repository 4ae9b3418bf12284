//! JSON envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use waqitly_core::errors::FieldErrors;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            errors: None,
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            errors,
        }
    }
}

/// A successful envelope paired with its status code.
pub struct Reply<T>(pub StatusCode, pub Envelope<T>);

impl<T: Serialize> Reply<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self(StatusCode::OK, Envelope::ok(data, message))
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self(StatusCode::CREATED, Envelope::ok(data, message))
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}
