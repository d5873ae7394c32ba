use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            post(handlers::appointments::book_appointment),
        )
        .route(
            "/api/counsellor/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/counsellor/appointments/:id",
            delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/api/counsellor/appointments/:id/status",
            patch(handlers::appointments::update_status),
        )
        .route(
            "/api/counsellor/appointments/:id/reschedule",
            patch(handlers::appointments::reschedule),
        )
        .route(
            "/api/counsellor/appointments/:id/start",
            patch(handlers::appointments::start),
        )
        .route(
            "/api/counsellor/appointments/:id/complete",
            patch(handlers::appointments::complete),
        )
        .route(
            "/api/counsellor/appointments/:id/notes/:counsellor_id",
            get(handlers::notes::get_note).put(handlers::notes::put_note),
        )
}
