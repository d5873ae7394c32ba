//! # Document Store
//!
//! The booking engine talks to storage only through [`DocumentStore`]. Reads
//! return records together with a version; every mutation is submitted as a
//! [`WriteBatch`] whose entries carry a precondition on that version. A store
//! applies a batch entirely or not at all, so a read-check-write sequence
//! becomes atomic once it commits without conflict.
//!
//! [`run_transaction`] is the optimistic loop on top of that: it rebuilds the
//! batch from fresh reads whenever a commit reports a conflict.

use std::future::Future;

use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{CounselError, CounselResult};
use crate::models::{
    appointment::Appointment,
    note::Note,
    notification::Notification,
    rating::{Rating, RatingAggregate},
    slot::{Slot, SlotKey},
};

/// Attempts made by [`run_transaction`] before giving up with
/// [`CounselError::TransactionConflict`].
pub const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// A stored record and the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: i64) -> Self {
        Self { value, version }
    }

    /// Precondition that holds only while the record is still at this version.
    pub fn expect(&self) -> Expect {
        Expect::Version(self.version)
    }
}

/// Precondition attached to a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The record must not exist yet.
    Absent,
    /// The record must still be at this version.
    Version(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    PutSlot { slot: Slot, expect: Expect },
    PutAppointment { appointment: Appointment, expect: Expect },
    DeleteAppointment { id: Uuid, expect: Expect },
    InsertRating { rating: Rating },
    PutAggregate { aggregate: RatingAggregate, expect: Expect },
    InsertNotification { notification: Notification },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_slot(mut self, slot: Slot, expect: Expect) -> Self {
        self.mutations.push(Mutation::PutSlot { slot, expect });
        self
    }

    pub fn put_appointment(mut self, appointment: Appointment, expect: Expect) -> Self {
        self.mutations
            .push(Mutation::PutAppointment { appointment, expect });
        self
    }

    pub fn delete_appointment(mut self, id: Uuid, expect: Expect) -> Self {
        self.mutations.push(Mutation::DeleteAppointment { id, expect });
        self
    }

    /// Ratings are write-once, so the record must not exist yet.
    pub fn insert_rating(mut self, rating: Rating) -> Self {
        self.mutations.push(Mutation::InsertRating { rating });
        self
    }

    pub fn put_aggregate(mut self, aggregate: RatingAggregate, expect: Expect) -> Self {
        self.mutations
            .push(Mutation::PutAggregate { aggregate, expect });
        self
    }

    /// Notifications are append-only.
    pub fn insert_notification(mut self, notification: Notification) -> Self {
        self.mutations
            .push(Mutation::InsertNotification { notification });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every mutation was written.
    Applied,
    /// A precondition failed; nothing was written.
    Conflict,
}

/// Transactional key-value storage for slots, appointments, ratings, notes
/// and student notifications.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<Versioned<Slot>>>;

    async fn list_slots(&self, counsellor_id: &str, date_key: &str) -> Result<Vec<Slot>>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Versioned<Appointment>>>;

    async fn list_appointments(&self, counsellor_id: &str, limit: usize)
    -> Result<Vec<Appointment>>;

    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>>;

    async fn get_aggregate(&self, counsellor_id: &str)
    -> Result<Option<Versioned<RatingAggregate>>>;

    /// Notifications of one student, newest first.
    async fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>>;

    async fn get_note(&self, appointment_id: Uuid, counsellor_id: &str) -> Result<Option<Note>>;

    /// Notes are last-writer-wins and sit outside the versioned records.
    async fn put_note(&self, note: Note) -> Result<Note>;

    /// Applies every mutation of `batch` or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome>;
}

/// Runs one optimistic transaction.
///
/// `attempt` reads what it needs and returns the batch to commit along with
/// the value to hand back on success. A domain error from `attempt` aborts
/// immediately; a commit conflict re-runs `attempt` against fresh reads.
pub async fn run_transaction<S, F, Fut, T>(
    store: &S,
    operation: &str,
    mut attempt: F,
) -> CounselResult<T>
where
    S: DocumentStore + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = CounselResult<(WriteBatch, T)>>,
{
    for n in 1..=MAX_TRANSACTION_ATTEMPTS {
        let (batch, value) = attempt().await?;
        if batch.is_empty() {
            return Ok(value);
        }

        match store.commit(batch).await? {
            CommitOutcome::Applied => return Ok(value),
            CommitOutcome::Conflict => {
                debug!(operation, attempt = n, "Commit conflict, retrying with fresh reads");
            }
        }
    }

    warn!(operation, "Giving up after {} conflicting commits", MAX_TRANSACTION_ATTEMPTS);
    Err(CounselError::TransactionConflict(format!(
        "{} did not commit after {} attempts",
        operation, MAX_TRANSACTION_ATTEMPTS
    )))
}
