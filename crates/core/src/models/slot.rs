use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a bookable slot: one counsellor, one calendar date, one start time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
}

impl SlotKey {
    pub fn new(
        counsellor_id: impl Into<String>,
        date_key: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            counsellor_id: counsellor_id.into(),
            date_key: date_key.into(),
            time: time.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.counsellor_id, self.date_key, self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    pub booked: bool,
    pub booked_by: Option<String>,
    pub session_id: Option<Uuid>,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    /// A freshly offered slot: active and unbooked.
    pub fn available(key: &SlotKey, now: DateTime<Utc>) -> Self {
        Self {
            counsellor_id: key.counsellor_id.clone(),
            date_key: key.date_key.clone(),
            time: key.time.clone(),
            booked: false,
            booked_by: None,
            session_id: None,
            active: true,
            updated_at: now,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(&self.counsellor_id, &self.date_key, &self.time)
    }

    pub fn book(&mut self, requester: &str, session_id: Uuid, now: DateTime<Utc>) {
        self.booked = true;
        self.booked_by = Some(requester.to_string());
        self.session_id = Some(session_id);
        self.updated_at = now;
    }

    pub fn release(&mut self, now: DateTime<Utc>) {
        self.booked = false;
        self.booked_by = None;
        self.session_id = None;
        self.updated_at = now;
    }

    /// Whether this slot is currently booked for the given appointment.
    pub fn is_held_by(&self, appointment_id: Uuid) -> bool {
        self.booked && self.session_id == Some(appointment_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSlotRequest {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSlotRequest {
    pub counsellor_id: String,
    pub date_key: String,
    pub time: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub counsellor_id: String,
    #[serde(default)]
    pub date_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub slots: Vec<Slot>,
}

/// Orders slots by start time, normalising legacy `HH.mm` times first.
pub fn sort_by_time(slots: &mut [Slot]) {
    for slot in slots.iter_mut() {
        slot.time = crate::date_key::normalize_time(&slot.time);
    }
    slots.sort_by(|a, b| a.time.cmp(&b.time));
}
