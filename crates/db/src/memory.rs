//! In-process [`DocumentStore`] used for development and tests.
//!
//! All records live behind one async `RwLock`. A batch is checked and applied
//! under a single write guard, which gives it the same all-or-nothing
//! behaviour as a database transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use counselsync_core::{
    models::{
        appointment::{Appointment, sort_by_schedule},
        note::Note,
        notification::Notification,
        rating::{Rating, RatingAggregate},
        slot::{Slot, SlotKey},
    },
    store::{CommitOutcome, DocumentStore, Expect, Mutation, Versioned, WriteBatch},
};
use eyre::Result;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    slots: HashMap<SlotKey, Versioned<Slot>>,
    appointments: HashMap<Uuid, Versioned<Appointment>>,
    ratings: HashMap<Uuid, Rating>,
    aggregates: HashMap<String, Versioned<RatingAggregate>>,
    notes: HashMap<(Uuid, String), Note>,
    notifications: HashMap<Uuid, Notification>,
}

fn holds<T>(current: Option<&Versioned<T>>, expect: Expect) -> bool {
    match (current, expect) {
        (None, Expect::Absent) => true,
        (Some(current), Expect::Version(version)) => current.version == version,
        _ => false,
    }
}

fn next_version(expect: Expect) -> i64 {
    match expect {
        Expect::Absent => 1,
        Expect::Version(version) => version + 1,
    }
}

impl MemoryState {
    /// Whether another live appointment already sits on this one's slot.
    fn slot_taken_by_other(&self, appointment: &Appointment) -> bool {
        !appointment.status.is_cancelled()
            && self.appointments.values().any(|other| {
                other.value.id != appointment.id
                    && !other.value.status.is_cancelled()
                    && other.value.counsellor_id == appointment.counsellor_id
                    && other.value.date_key == appointment.date_key
                    && other.value.time == appointment.time
            })
    }

    fn precondition_holds(&self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::PutSlot { slot, expect } => holds(self.slots.get(&slot.key()), *expect),
            Mutation::PutAppointment { appointment, expect } => {
                holds(self.appointments.get(&appointment.id), *expect)
                    && !self.slot_taken_by_other(appointment)
            }
            Mutation::DeleteAppointment { id, expect } => {
                matches!(expect, Expect::Version(_)) && holds(self.appointments.get(id), *expect)
            }
            Mutation::InsertRating { rating } => !self.ratings.contains_key(&rating.id),
            Mutation::PutAggregate { aggregate, expect } => {
                holds(self.aggregates.get(&aggregate.counsellor_id), *expect)
            }
            Mutation::InsertNotification { notification } => {
                !self.notifications.contains_key(&notification.id)
            }
        }
    }

    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::PutSlot { slot, expect } => {
                let version = next_version(expect);
                self.slots.insert(slot.key(), Versioned::new(slot, version));
            }
            Mutation::PutAppointment { appointment, expect } => {
                let version = next_version(expect);
                self.appointments
                    .insert(appointment.id, Versioned::new(appointment, version));
            }
            Mutation::DeleteAppointment { id, .. } => {
                self.appointments.remove(&id);
            }
            Mutation::InsertRating { rating } => {
                self.ratings.insert(rating.id, rating);
            }
            Mutation::PutAggregate { aggregate, expect } => {
                let version = next_version(expect);
                self.aggregates.insert(
                    aggregate.counsellor_id.clone(),
                    Versioned::new(aggregate, version),
                );
            }
            Mutation::InsertNotification { notification } => {
                self.notifications.insert(notification.id, notification);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<Versioned<Slot>>> {
        Ok(self.state.read().await.slots.get(key).cloned())
    }

    async fn list_slots(&self, counsellor_id: &str, date_key: &str) -> Result<Vec<Slot>> {
        let state = self.state.read().await;
        Ok(state
            .slots
            .values()
            .filter(|slot| slot.value.counsellor_id == counsellor_id && slot.value.date_key == date_key)
            .map(|slot| slot.value.clone())
            .collect())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Versioned<Appointment>>> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn list_appointments(
        &self,
        counsellor_id: &str,
        limit: usize,
    ) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| appointment.value.counsellor_id == counsellor_id)
            .map(|appointment| appointment.value.clone())
            .collect();
        sort_by_schedule(&mut appointments);
        appointments.truncate(limit);
        Ok(appointments)
    }

    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>> {
        Ok(self.state.read().await.ratings.get(&id).cloned())
    }

    async fn get_aggregate(
        &self,
        counsellor_id: &str,
    ) -> Result<Option<Versioned<RatingAggregate>>> {
        Ok(self.state.read().await.aggregates.get(counsellor_id).cloned())
    }

    async fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
        let state = self.state.read().await;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|notification| notification.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications.truncate(limit);
        Ok(notifications)
    }

    async fn get_note(&self, appointment_id: Uuid, counsellor_id: &str) -> Result<Option<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .get(&(appointment_id, counsellor_id.to_string()))
            .cloned())
    }

    async fn put_note(&self, note: Note) -> Result<Note> {
        let mut state = self.state.write().await;
        state
            .notes
            .insert((note.appointment_id, note.counsellor_id.clone()), note.clone());
        Ok(note)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome> {
        let mut state = self.state.write().await;

        if let Some(index) = batch
            .mutations()
            .iter()
            .position(|mutation| !state.precondition_holds(mutation))
        {
            debug!(index, "Precondition failed, batch discarded");
            return Ok(CommitOutcome::Conflict);
        }

        for mutation in batch.into_mutations() {
            state.apply(mutation);
        }
        Ok(CommitOutcome::Applied)
    }
}
