use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_key;
use crate::errors::CounselError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    #[serde(alias = "approved")]
    Confirmed,
    #[serde(alias = "in_progress")]
    Started,
    Completed,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Started => "started",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" | "approved" => Ok(AppointmentStatus::Confirmed),
            "started" | "in_progress" => Ok(AppointmentStatus::Started),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(CounselError::InvalidPayload(format!(
                "Invalid status: {}",
                other
            ))),
        }
    }
}

/// Descriptive fields a student supplies when booking. None of them take part
/// in slot allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counsellor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub student_id: String,
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(flatten)]
    pub details: AppointmentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    pub student_id: String,
    #[serde(flatten)]
    pub details: AppointmentDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentResponse {
    pub success: bool,
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    #[serde(default)]
    pub counsellor_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub counsellor_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub counsellor_id: String,
}

/// Body of the start, complete and delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounsellorActionRequest {
    #[serde(default)]
    pub counsellor_id: String,
}

/// Calendar day of a date key in either notation.
fn calendar_day(date_key: &str) -> Option<NaiveDate> {
    let date_key = date_key.trim();
    NaiveDate::parse_from_str(date_key, date_key::YEAR_FIRST)
        .or_else(|_| NaiveDate::parse_from_str(date_key, date_key::DAY_FIRST))
        .ok()
}

/// Orders appointments by calendar day, then time. Keys in neither date
/// notation sort after the dated ones, by their raw text.
pub fn sort_by_schedule(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| {
        let day_a = calendar_day(&a.date_key);
        let day_b = calendar_day(&b.date_key);
        match (day_a, day_b) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.date_key.cmp(&b.date_key),
        }
        .then_with(|| a.time.cmp(&b.time))
    });
}
