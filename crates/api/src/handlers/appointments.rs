//! # Appointment Handlers
//!
//! Student booking plus the counsellor-side lifecycle: status changes,
//! reschedule, start, complete and delete. Every handler here hands the
//! request to the booking engine, which commits the appointment and its slot
//! together.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use counselsync_core::{
    booking,
    models::{
        SuccessResponse,
        appointment::{
            AppointmentListQuery, AppointmentListResponse, AppointmentStatus,
            BookAppointmentRequest, BookAppointmentResponse, CounsellorActionRequest,
            RescheduleRequest, UpdateStatusRequest,
        },
    },
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Books a slot for a student
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// {"counsellorId": "...", "dateKey": "2024-05-01", "time": "10:00", "studentId": "..."}
/// ```
///
/// # Errors
///
/// * `SlotNotFound` (404) - no active slot under either date notation
/// * `SlotAlreadyBooked` (409) - someone else holds the slot
/// * `TransactionConflict` (503) - too much contention, try again
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<Json<BookAppointmentResponse>, AppError> {
    let Json(payload) = payload?;

    let appointment_id = booking::book_slot(
        state.store.as_ref(),
        &payload.counsellor_id,
        &payload.date_key,
        &payload.time,
        &payload.student_id,
        &payload.details,
    )
    .await?;

    Ok(Json(BookAppointmentResponse {
        success: true,
        appointment_id,
    }))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<AppointmentListQuery>, QueryRejection>,
) -> Result<Json<AppointmentListResponse>, AppError> {
    let Query(query) = query?;

    let appointments =
        booking::list_appointments(state.store.as_ref(), &query.counsellor_id, query.limit)
            .await?;

    Ok(Json(AppointmentListResponse { appointments }))
}

/// Sets an appointment to `pending`, `confirmed` or `cancelled`
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let status: AppointmentStatus = payload.status.parse()?;
    booking::update_status(state.store.as_ref(), id, &payload.counsellor_id, status).await?;

    Ok(Json(SuccessResponse::ok()))
}

#[axum::debug_handler]
pub async fn reschedule(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RescheduleRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    booking::reschedule_appointment(
        state.store.as_ref(),
        id,
        &payload.counsellor_id,
        &payload.appointment_date,
        &payload.appointment_time,
    )
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

#[axum::debug_handler]
pub async fn start(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CounsellorActionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    booking::start_appointment(state.store.as_ref(), id, &payload.counsellor_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

#[axum::debug_handler]
pub async fn complete(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CounsellorActionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    booking::complete_appointment(state.store.as_ref(), id, &payload.counsellor_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Removes an appointment and frees its slot; repeating it is harmless
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CounsellorActionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    booking::delete_appointment(state.store.as_ref(), id, &payload.counsellor_id).await?;

    Ok(Json(SuccessResponse::ok()))
}
