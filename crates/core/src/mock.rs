use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    appointment::Appointment,
    note::Note,
    notification::Notification,
    rating::{Rating, RatingAggregate},
    slot::{Slot, SlotKey},
};
use crate::store::{CommitOutcome, DocumentStore, Versioned, WriteBatch};

// Mock store for testing engine logic without a backend
mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        async fn get_slot(&self, key: &SlotKey) -> eyre::Result<Option<Versioned<Slot>>>;

        async fn list_slots(&self, counsellor_id: &str, date_key: &str) -> eyre::Result<Vec<Slot>>;

        async fn get_appointment(&self, id: Uuid) -> eyre::Result<Option<Versioned<Appointment>>>;

        async fn list_appointments(
            &self,
            counsellor_id: &str,
            limit: usize,
        ) -> eyre::Result<Vec<Appointment>>;

        async fn get_rating(&self, id: Uuid) -> eyre::Result<Option<Rating>>;

        async fn get_aggregate(
            &self,
            counsellor_id: &str,
        ) -> eyre::Result<Option<Versioned<RatingAggregate>>>;

        async fn list_notifications(
            &self,
            user_id: &str,
            limit: usize,
        ) -> eyre::Result<Vec<Notification>>;

        async fn get_note(&self, appointment_id: Uuid, counsellor_id: &str) -> eyre::Result<Option<Note>>;

        async fn put_note(&self, note: Note) -> eyre::Result<Note>;

        async fn commit(&self, batch: WriteBatch) -> eyre::Result<CommitOutcome>;
    }
}
