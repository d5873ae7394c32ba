//! # Notification Handlers
//!
//! Students read the notifications the appointment lifecycle wrote for them.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use counselsync_core::{
    models::notification::{NotificationListQuery, NotificationListResponse},
    notifications,
};

use crate::{ApiState, middleware::error_handling::AppError};

/// Lists a student's notifications, newest first
///
/// # Endpoint
///
/// ```text
/// GET /api/notifications?studentId=...&limit=20
/// ```
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<NotificationListQuery>, QueryRejection>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let Query(query) = query?;

    let notifications =
        notifications::list_notifications(state.store.as_ref(), &query.student_id, query.limit)
            .await?;

    Ok(Json(NotificationListResponse { notifications }))
}
