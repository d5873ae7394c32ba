use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/ratings", post(handlers::ratings::submit_rating))
        .route(
            "/api/ratings/:counsellor_id",
            get(handlers::ratings::get_rating),
        )
}
