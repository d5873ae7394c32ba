use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CounselError;
use crate::models::{
    appointment::{Appointment, AppointmentStatus},
    feed::FeedItem,
};

/// Feed tag of notifications addressed to one student.
pub const STUDENT_SOURCE: &str = "student";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AppointmentStatus,
    AppointmentCompleted,
    AppointmentDeleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AppointmentStatus => "appointment_status",
            NotificationKind::AppointmentCompleted => "appointment_completed",
            NotificationKind::AppointmentDeleted => "appointment_deleted",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CounselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appointment_status" => Ok(NotificationKind::AppointmentStatus),
            "appointment_completed" => Ok(NotificationKind::AppointmentCompleted),
            "appointment_deleted" => Ok(NotificationKind::AppointmentDeleted),
            other => Err(CounselError::InvalidPayload(format!(
                "Unknown notification type: {}",
                other
            ))),
        }
    }
}

/// In-app message telling a student what happened to one of their
/// appointments. Written in the same commit as the change it reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub appointment_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    fn for_student(
        appointment: &Appointment,
        kind: NotificationKind,
        title: String,
        body: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: appointment.student_id.clone(),
            kind,
            title,
            body,
            appointment_id: appointment.id,
            status: None,
            created_at: now,
            read: false,
        }
    }

    /// The counsellor moved the appointment to `status`.
    pub fn status_changed(
        appointment: &Appointment,
        status: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> Self {
        let mut notification = Self::for_student(
            appointment,
            NotificationKind::AppointmentStatus,
            format!("Appointment {}", status),
            format!(
                "Your session on {} at {} is {}.",
                appointment.date_key, appointment.time, status
            ),
            now,
        );
        notification.status = Some(status);
        notification
    }

    /// The session is over; the student is asked for feedback.
    pub fn completed(appointment: &Appointment, now: DateTime<Utc>) -> Self {
        let mut notification = Self::for_student(
            appointment,
            NotificationKind::AppointmentCompleted,
            "Session completed".to_string(),
            "Please leave quick feedback for your counsellor.".to_string(),
            now,
        );
        notification.status = Some(AppointmentStatus::Completed);
        notification
    }

    pub fn deleted(appointment: &Appointment, now: DateTime<Utc>) -> Self {
        Self::for_student(
            appointment,
            NotificationKind::AppointmentDeleted,
            "Appointment cancelled".to_string(),
            format!(
                "Your session on {} at {} was cancelled.",
                appointment.date_key, appointment.time
            ),
            now,
        )
    }

    /// Feed entry tagged [`STUDENT_SOURCE`], categorised by kind.
    pub fn to_feed_item(&self) -> FeedItem {
        let mut item = FeedItem::new(
            self.title.clone(),
            format!("/appointments/{}/notifications/{}", self.appointment_id, self.id),
            STUDENT_SOURCE,
        )
        .with_category(self.kind.as_str())
        .with_created_at(self.created_at);
        item.body = Some(self.body.clone());
        item
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    #[serde(default)]
    pub student_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}
