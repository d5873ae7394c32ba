use std::str::FromStr;

use chrono::{DateTime, Utc};
use counselsync_core::{
    models::{
        appointment::{Appointment, AppointmentDetails, AppointmentStatus},
        note::Note,
        notification::{Notification, NotificationKind},
        rating::{Rating, RatingAggregate},
        slot::Slot,
    },
    store::Versioned,
};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    pub booked: bool,
    pub booked_by: Option<String>,
    pub session_id: Option<Uuid>,
    pub active: bool,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<DbSlot> for Versioned<Slot> {
    fn from(row: DbSlot) -> Self {
        Versioned::new(
            Slot {
                counsellor_id: row.counsellor_id,
                date_key: row.date_key,
                time: row.time,
                booked: row.booked,
                booked_by: row.booked_by,
                session_id: row.session_id,
                active: row.active,
                updated_at: row.updated_at,
            },
            row.version,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub student_id: String,
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    pub status: String,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub counsellor_name: Option<String>,
    pub reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Versioned<Appointment> {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let status = row
            .status
            .parse::<AppointmentStatus>()
            .map_err(|e| eyre!("Appointment {} has unreadable status: {}", row.id, e))?;

        Ok(Versioned::new(
            Appointment {
                id: row.id,
                student_id: row.student_id,
                counsellor_id: row.counsellor_id,
                date_key: row.date_key,
                time: row.time,
                status,
                details: AppointmentDetails {
                    student_name: row.student_name,
                    student_email: row.student_email,
                    counsellor_name: row.counsellor_name,
                    reason: row.reason,
                },
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            row.version,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRating {
    pub id: Uuid,
    pub counsellor_id: String,
    pub student_id: String,
    pub appointment_id: Option<Uuid>,
    pub stars: i16,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbRating> for Rating {
    type Error = eyre::Report;

    fn try_from(row: DbRating) -> Result<Self> {
        let stars = u8::try_from(row.stars)
            .map_err(|_| eyre!("Rating {} has out-of-range stars {}", row.id, row.stars))?;

        Ok(Rating {
            id: row.id,
            counsellor_id: row.counsellor_id,
            student_id: row.student_id,
            appointment_id: row.appointment_id,
            stars,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRatingAggregate {
    pub counsellor_id: String,
    pub rating_count: i64,
    pub rating_sum: i64,
    pub rating: f64,
    pub version: i64,
}

impl From<DbRatingAggregate> for Versioned<RatingAggregate> {
    fn from(row: DbRatingAggregate) -> Self {
        Versioned::new(
            RatingAggregate {
                counsellor_id: row.counsellor_id,
                rating_count: row.rating_count,
                rating_sum: row.rating_sum,
                rating: row.rating,
            },
            row.version,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNote {
    pub appointment_id: Uuid,
    pub counsellor_id: String,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

impl From<DbNote> for Note {
    fn from(row: DbNote) -> Self {
        Note {
            appointment_id: row.appointment_id,
            counsellor_id: row.counsellor_id,
            text: row.text,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub appointment_id: Uuid,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl TryFrom<DbNotification> for Notification {
    type Error = eyre::Report;

    fn try_from(row: DbNotification) -> Result<Self> {
        let kind = row
            .kind
            .parse::<NotificationKind>()
            .map_err(|e| eyre!("Notification {} has unreadable type: {}", row.id, e))?;
        let status = row
            .status
            .as_deref()
            .map(AppointmentStatus::from_str)
            .transpose()
            .map_err(|e| eyre!("Notification {} has unreadable status: {}", row.id, e))?;

        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind,
            title: row.title,
            body: row.body,
            appointment_id: row.appointment_id,
            status,
            created_at: row.created_at,
            read: row.read,
        })
    }
}
