//! HTTP client for the CounselSync API.
//!
//! Transport failures and unexpected statuses come back as
//! [`CounselError::Network`], which pollers treat as a reason to back off.
//! Statuses with a domain meaning map back to the matching error variant.

use std::time::Duration;

use counselsync_core::{
    errors::{CounselError, CounselResult},
    models::{
        SuccessResponse,
        appointment::{
            Appointment, AppointmentListResponse, BookAppointmentRequest,
            BookAppointmentResponse,
        },
        note::{Note, NoteResponse, PutNoteRequest},
        notification::{Notification, NotificationListResponse},
        rating::{RatingAggregate, SubmitRatingRequest},
        slot::{Slot, SlotListResponse, UpsertSlotRequest},
    },
};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A non-success answer from the API.
#[derive(Debug)]
struct HttpFailure {
    status: StatusCode,
    message: String,
}

impl HttpFailure {
    fn into_error(self) -> CounselError {
        match self.status {
            StatusCode::BAD_REQUEST => CounselError::InvalidPayload(self.message),
            StatusCode::FORBIDDEN => CounselError::Authorization(self.message),
            StatusCode::NOT_FOUND => CounselError::NotFound(self.message),
            StatusCode::SERVICE_UNAVAILABLE => CounselError::TransactionConflict(self.message),
            status => CounselError::Network(format!("{}: {}", status, self.message)),
        }
    }
}

fn transport_error(err: reqwest::Error) -> CounselError {
    CounselError::Network(err.to_string())
}

#[derive(Debug, Clone)]
pub struct CounselApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl CounselApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> eyre::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> eyre::Result<Self> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> CounselResult<Result<T, HttpFailure>> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            let body = response.json::<T>().await.map_err(transport_error)?;
            return Ok(Ok(body));
        }

        let text = response.text().await.map_err(transport_error)?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        debug!(%status, %message, "API request failed");
        Ok(Err(HttpFailure { status, message }))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> CounselResult<T> {
        self.send(request).await?.map_err(HttpFailure::into_error)
    }

    /// Books a slot and returns the new appointment id.
    pub async fn book_appointment(&self, request: &BookAppointmentRequest) -> CounselResult<Uuid> {
        let outcome = self
            .send::<BookAppointmentResponse>(self.http.post(self.url("/api/appointments")).json(request))
            .await?;

        match outcome {
            Ok(body) => Ok(body.appointment_id),
            Err(failure) if failure.status == StatusCode::NOT_FOUND => {
                Err(CounselError::SlotNotFound(failure.message))
            }
            Err(failure) if failure.status == StatusCode::CONFLICT => {
                Err(CounselError::SlotAlreadyBooked(failure.message))
            }
            Err(failure) => Err(failure.into_error()),
        }
    }

    pub async fn list_appointments(
        &self,
        counsellor_id: &str,
        limit: Option<usize>,
    ) -> CounselResult<Vec<Appointment>> {
        let mut path = format!(
            "/api/counsellor/appointments?counsellorId={}",
            urlencoding::encode(counsellor_id)
        );
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={}", limit));
        }

        let body: AppointmentListResponse = self.call(self.http.get(self.url(&path))).await?;
        Ok(body.appointments)
    }

    pub async fn upsert_slot(&self, request: &UpsertSlotRequest) -> CounselResult<()> {
        let _: SuccessResponse = self
            .call(
                self.http
                    .post(self.url("/api/counsellor/availability/slot"))
                    .json(request),
            )
            .await?;
        Ok(())
    }

    pub async fn list_slots(&self, counsellor_id: &str, date_key: &str) -> CounselResult<Vec<Slot>> {
        let path = format!(
            "/api/counsellor/availability?counsellorId={}&dateKey={}",
            urlencoding::encode(counsellor_id),
            urlencoding::encode(date_key)
        );

        let body: SlotListResponse = self.call(self.http.get(self.url(&path))).await?;
        Ok(body.slots)
    }

    fn note_path(appointment_id: Uuid, counsellor_id: &str) -> String {
        format!(
            "/api/counsellor/appointments/{}/notes/{}",
            appointment_id,
            urlencoding::encode(counsellor_id)
        )
    }

    pub async fn get_note(
        &self,
        appointment_id: Uuid,
        counsellor_id: &str,
    ) -> CounselResult<Option<Note>> {
        let path = Self::note_path(appointment_id, counsellor_id);
        let body: NoteResponse = self.call(self.http.get(self.url(&path))).await?;
        Ok(body.note)
    }

    pub async fn put_note(
        &self,
        appointment_id: Uuid,
        counsellor_id: &str,
        text: &str,
    ) -> CounselResult<Option<Note>> {
        let path = Self::note_path(appointment_id, counsellor_id);
        let request = PutNoteRequest {
            text: text.to_string(),
        };
        let body: NoteResponse = self
            .call(self.http.put(self.url(&path)).json(&request))
            .await?;
        Ok(body.note)
    }

    pub async fn list_notifications(
        &self,
        student_id: &str,
        limit: Option<usize>,
    ) -> CounselResult<Vec<Notification>> {
        let mut path = format!(
            "/api/notifications?studentId={}",
            urlencoding::encode(student_id)
        );
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={}", limit));
        }

        let body: NotificationListResponse = self.call(self.http.get(self.url(&path))).await?;
        Ok(body.notifications)
    }

    /// Submits a rating; a second rating for the same appointment is a
    /// [`CounselError::DuplicateRating`].
    pub async fn submit_rating(
        &self,
        request: &SubmitRatingRequest,
    ) -> CounselResult<RatingAggregate> {
        let outcome = self
            .send::<RatingAggregate>(self.http.post(self.url("/api/ratings")).json(request))
            .await?;

        match (outcome, request.appointment_id) {
            (Ok(aggregate), _) => Ok(aggregate),
            (Err(failure), Some(appointment_id)) if failure.status == StatusCode::CONFLICT => {
                Err(CounselError::DuplicateRating(appointment_id))
            }
            (Err(failure), _) => Err(failure.into_error()),
        }
    }

    pub async fn get_rating(&self, counsellor_id: &str) -> CounselResult<RatingAggregate> {
        let path = format!("/api/ratings/{}", urlencoding::encode(counsellor_id));
        self.call(self.http.get(self.url(&path))).await
    }
}
