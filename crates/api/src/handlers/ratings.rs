//! # Rating Handlers
//!
//! A rating tied to an appointment counts once; resubmitting it answers 409
//! and leaves the counsellor's totals untouched.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use counselsync_core::{
    models::rating::{RatingAggregate, SubmitRatingRequest},
    rating,
};

use crate::{ApiState, middleware::error_handling::AppError};

/// Records a rating and answers with the updated totals
#[axum::debug_handler]
pub async fn submit_rating(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SubmitRatingRequest>, JsonRejection>,
) -> Result<Json<RatingAggregate>, AppError> {
    let Json(payload) = payload?;

    let aggregate = rating::submit_rating(state.store.as_ref(), &payload).await?;

    Ok(Json(aggregate))
}

#[axum::debug_handler]
pub async fn get_rating(
    State(state): State<Arc<ApiState>>,
    counsellor_id: Result<Path<String>, PathRejection>,
) -> Result<Json<RatingAggregate>, AppError> {
    let Path(counsellor_id) = counsellor_id?;

    let aggregate = rating::get_rating_summary(state.store.as_ref(), &counsellor_id).await?;

    Ok(Json(aggregate))
}
