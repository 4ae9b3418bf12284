//! # Waqitly Core
//!
//! Domain types and the time-slot reservation engine: interval model, conflict
//! detection, the reservation lifecycle, field validation and the repository
//! contract the storage layer implements.

pub mod clock;
pub mod conflict;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
