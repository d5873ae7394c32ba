use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use counselsync_core::{
    models::note::{NoteResponse, PutNoteRequest},
    notes,
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn get_note(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
) -> Result<Json<NoteResponse>, AppError> {
    let Path((appointment_id, counsellor_id)) = path?;

    let note = notes::get_note(state.store.as_ref(), appointment_id, &counsellor_id).await?;

    Ok(Json(NoteResponse { note }))
}

/// Replaces the note; the last write wins
#[axum::debug_handler]
pub async fn put_note(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
    payload: Result<Json<PutNoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, AppError> {
    let Path((appointment_id, counsellor_id)) = path?;
    let Json(payload) = payload?;

    let note =
        notes::put_note(state.store.as_ref(), appointment_id, &counsellor_id, &payload.text)
            .await?;

    Ok(Json(NoteResponse { note: Some(note) }))
}
