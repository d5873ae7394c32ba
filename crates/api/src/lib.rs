//! # CounselSync API
//!
//! HTTP surface of the counselling booking service: slot availability,
//! student bookings, the counsellor-side appointment lifecycle, session notes,
//! ratings and student notifications.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, one module per area
//! - **Handlers**: Extract requests and call into `counselsync_core`
//! - **Middleware**: Error mapping to the shared `{success, error}` body
//! - **Config**: Environment configuration
//!
//! Handlers never touch storage directly. Everything goes through the
//! booking, availability, rating and notes operations of `counselsync_core`
//! against the [`DocumentStore`] held in [`ApiState`].

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling shared by all handlers
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use counselsync_core::store::DocumentStore;
use eyre::Result;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use counselsync_api::{ApiState, build_router};
/// use counselsync_db::MemoryStore;
///
/// let state = Arc::new(ApiState::new(Arc::new(MemoryStore::new())));
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// Transactional store for slots, appointments, ratings and notes
    pub store: Arc<dyn DocumentStore>,
}

impl ApiState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

/// Builds the application router with every route and request tracing.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Counsellor availability endpoints
        .merge(routes::availability::routes())
        // Booking and appointment lifecycle endpoints
        .merge(routes::appointments::routes())
        // Rating endpoints
        .merge(routes::ratings::routes())
        // Student notification endpoints
        .merge(routes::notifications::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "success": false, "error": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server on the given store
///
/// Installs the tracing subscriber at the configured level, then serves
/// until the listener fails.
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn DocumentStore>) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already installed");
    }

    let state = Arc::new(ApiState::new(store));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) if !origins.is_empty() => app.layer(cors_layer(origins)?),
        _ => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(backend = ?config.store_backend, "Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
