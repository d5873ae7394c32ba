//! # Availability Handlers
//!
//! Counsellors publish the slots students can book. Slots are written under
//! the date key exactly as sent; only booking looks at the alternate
//! notation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use counselsync_core::{
    availability,
    models::{
        SuccessResponse,
        slot::{AvailabilityQuery, SlotListResponse, ToggleSlotRequest, UpsertSlotRequest},
    },
};

use crate::{ApiState, middleware::error_handling::AppError};

/// Offers a slot, creating it when needed
///
/// # Endpoint
///
/// ```text
/// POST /api/counsellor/availability/slot
/// {"counsellorId": "...", "dateKey": "2024-05-01", "time": "10:00"}
/// ```
#[axum::debug_handler]
pub async fn upsert_slot(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<UpsertSlotRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;

    availability::upsert_slot(
        state.store.as_ref(),
        &payload.counsellor_id,
        &payload.date_key,
        &payload.time,
    )
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Shows or hides a slot without touching its booking
#[axum::debug_handler]
pub async fn toggle_slot(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ToggleSlotRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;

    availability::toggle_slot(
        state.store.as_ref(),
        &payload.counsellor_id,
        &payload.date_key,
        &payload.time,
        payload.active,
    )
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<SlotListResponse>, AppError> {
    let Query(query) = query?;

    let slots =
        availability::list_slots(state.store.as_ref(), &query.counsellor_id, &query.date_key)
            .await?;

    Ok(Json(SlotListResponse { slots }))
}
