//! # CounselSync Core
//!
//! Domain types and the transactional logic of counsellor slot booking:
//!
//! - **store**: the storage contract and the optimistic transaction loop
//! - **booking**: slot booking and the appointment lifecycle
//! - **availability**: offering and hiding slots
//! - **rating**: idempotent rating aggregation
//! - **notifications**: student notifications written by the lifecycle
//! - **feed**: merging of resource and notification streams
//!
//! Storage backends live in `counselsync-db`; HTTP lives in `counselsync-api`.

pub mod availability;
pub mod booking;
pub mod date_key;
pub mod errors;
pub mod feed;
pub mod models;
pub mod notes;
pub mod notifications;
pub mod rating;
pub mod store;

pub mod mock;
