//! # Waqitly API
//!
//! HTTP surface of the Waqitly reservation engine: reservations, bookings
//! and the operational health/version endpoints.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into service calls
//! - **Middleware**: Error mapping and request extractors
//! - **Response**: The `{success, data, message, errors}` envelope
//! - **Config**: Handle environment and application configuration
//!
//! Business rules live in `waqitly-core`; storage in `waqitly-db`.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping and extractors
pub mod middleware;
/// Success and failure envelopes
pub mod response;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use waqitly_core::clock::{Clock, SystemClock};
use waqitly_core::errors::BookingError;
use waqitly_core::repository::{BookingRepository, ReservationRepository};
use waqitly_core::services::{BookingService, ReservationService};
use waqitly_db::{DbPool, PgBookingRepository, PgReservationRepository};

use crate::middleware::error_handling::AppError;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub reservations: ReservationService,
    pub bookings: BookingService,
}

impl ApiState {
    /// Wires both services to the given repositories and clock.
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        bookings: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations: ReservationService::new(reservations, clock.clone()),
            bookings: BookingService::new(bookings, clock),
        }
    }

    /// State backed by PostgreSQL and the system clock.
    pub fn postgres(pool: DbPool) -> Self {
        Self::new(
            Arc::new(PgReservationRepository::new(pool.clone())),
            Arc::new(PgBookingRepository::new(pool)),
            Arc::new(SystemClock),
        )
    }
}

async fn fallback() -> AppError {
    AppError(BookingError::NotFound("Route".to_string()))
}

/// Builds the application router with every route and request tracing.
pub fn app(state: ApiState) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Reservation endpoints
        .merge(routes::reservation::routes())
        // Booking endpoints
        .merge(routes::booking::routes())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        // Attach shared state to all routes
        .with_state(Arc::new(state))
}

/// Starts the API server with the provided configuration and database connection
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = waqitly_api::config::ApiConfig::from_env()?;
/// let pool = waqitly_db::create_pool(&config.database_url, config.database_max_connections).await?;
/// waqitly_api::start_server(config, pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = app(ApiState::postgres(db_pool));

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new().layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
