use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/counsellor/availability",
            get(handlers::availability::list_slots),
        )
        .route(
            "/api/counsellor/availability/slot",
            post(handlers::availability::upsert_slot),
        )
        .route(
            "/api/counsellor/availability/toggle",
            patch(handlers::availability::toggle_slot),
        )
}
