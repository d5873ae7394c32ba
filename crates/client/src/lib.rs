//! # CounselSync Client
//!
//! Consumer side of the CounselSync API: a typed HTTP client, the adaptive
//! poller that keeps dashboards fresh without server push, and the feeds
//! built on top of both.

pub mod api;
pub mod config;
pub mod feeds;
pub mod poller;

pub use api::CounselApiClient;
pub use poller::{Backoff, PollOptions, Subscription, subscribe};
