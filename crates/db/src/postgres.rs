//! PostgreSQL-backed [`DocumentStore`].
//!
//! Each [`WriteBatch`] runs in one SQL transaction. `Expect::Absent` becomes
//! an `INSERT … ON CONFLICT DO NOTHING`, `Expect::Version` an
//! `UPDATE … WHERE version = $n`. A statement that touches no row, or trips
//! the unique index on live appointments, rolls the whole batch back and is
//! reported as a conflict.

use async_trait::async_trait;
use counselsync_core::{
    models::{
        appointment::Appointment,
        note::Note,
        notification::Notification,
        rating::{Rating, RatingAggregate},
        slot::{Slot, SlotKey},
    },
    store::{CommitOutcome, DocumentStore, Expect, Mutation, Versioned, WriteBatch},
};
use eyre::{Result, bail};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::repositories::{appointment, note, notification, rating, slot};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Applies one mutation. `Ok(false)` means its precondition did not hold.
async fn apply(conn: &mut PgConnection, mutation: &Mutation) -> Result<bool> {
    match mutation {
        Mutation::PutSlot { slot, expect: Expect::Absent } => slot::insert_slot(conn, slot).await,
        Mutation::PutSlot { slot, expect: Expect::Version(version) } => {
            slot::update_slot(conn, slot, *version).await
        }
        Mutation::PutAppointment { appointment, expect: Expect::Absent } => {
            appointment::insert_appointment(conn, appointment).await
        }
        Mutation::PutAppointment { appointment, expect: Expect::Version(version) } => {
            appointment::update_appointment(conn, appointment, *version).await
        }
        Mutation::DeleteAppointment { id, expect: Expect::Version(version) } => {
            appointment::delete_appointment(conn, *id, *version).await
        }
        Mutation::DeleteAppointment { id, expect: Expect::Absent } => {
            bail!("Deleting appointment {} requires a version precondition", id)
        }
        Mutation::InsertRating { rating } => rating::insert_rating(conn, rating).await,
        Mutation::PutAggregate { aggregate, expect: Expect::Absent } => {
            rating::insert_aggregate(conn, aggregate).await
        }
        Mutation::PutAggregate { aggregate, expect: Expect::Version(version) } => {
            rating::update_aggregate(conn, aggregate, *version).await
        }
        Mutation::InsertNotification { notification } => {
            notification::insert_notification(conn, notification).await
        }
    }
}

fn is_unique_violation(err: &eyre::Report) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<Versioned<Slot>>> {
        Ok(slot::get_slot(&self.pool, key).await?.map(Into::into))
    }

    async fn list_slots(&self, counsellor_id: &str, date_key: &str) -> Result<Vec<Slot>> {
        let rows = slot::list_slots(&self.pool, counsellor_id, date_key).await?;
        Ok(rows
            .into_iter()
            .map(|row| Versioned::<Slot>::from(row).value)
            .collect())
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Versioned<Appointment>>> {
        appointment::get_appointment(&self.pool, id)
            .await?
            .map(Versioned::<Appointment>::try_from)
            .transpose()
    }

    async fn list_appointments(
        &self,
        counsellor_id: &str,
        limit: usize,
    ) -> Result<Vec<Appointment>> {
        let rows = appointment::list_appointments(&self.pool, counsellor_id, limit).await?;
        rows.into_iter()
            .map(|row| Versioned::<Appointment>::try_from(row).map(|v| v.value))
            .collect()
    }

    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>> {
        rating::get_rating(&self.pool, id)
            .await?
            .map(Rating::try_from)
            .transpose()
    }

    async fn get_aggregate(
        &self,
        counsellor_id: &str,
    ) -> Result<Option<Versioned<RatingAggregate>>> {
        Ok(rating::get_aggregate(&self.pool, counsellor_id)
            .await?
            .map(Into::into))
    }

    async fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
        let rows = notification::list_notifications(&self.pool, user_id, limit).await?;
        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn get_note(&self, appointment_id: Uuid, counsellor_id: &str) -> Result<Option<Note>> {
        Ok(note::get_note(&self.pool, appointment_id, counsellor_id)
            .await?
            .map(Into::into))
    }

    async fn put_note(&self, note: Note) -> Result<Note> {
        Ok(note::upsert_note(&self.pool, &note).await?.into())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await?;

        for (index, mutation) in batch.mutations().iter().enumerate() {
            match apply(&mut tx, mutation).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(index, "Precondition failed, rolling back batch");
                    tx.rollback().await?;
                    return Ok(CommitOutcome::Conflict);
                }
                Err(err) if is_unique_violation(&err) => {
                    debug!(index, "Unique violation, rolling back batch");
                    tx.rollback().await?;
                    return Ok(CommitOutcome::Conflict);
                }
                Err(err) => return Err(err),
            }
        }

        tx.commit().await?;
        Ok(CommitOutcome::Applied)
    }
}
