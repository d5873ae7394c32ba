//! Poll-backed views the dashboards keep open: the counsellor's appointment
//! list, one day's slots, the private note of one appointment, and a student's
//! notifications merged into a global stream. Each feed pairs a fetch against
//! [`CounselApiClient`] with its own transform and shares the backoff
//! behaviour of [`subscribe`].

use std::sync::Arc;

use counselsync_core::{
    errors::CounselError,
    feed::merge_streams,
    models::{
        appointment::{Appointment, sort_by_schedule},
        feed::FeedItem,
        note::Note,
        notification::Notification,
        slot::{Slot, sort_by_time},
    },
};
use uuid::Uuid;

use crate::{
    api::CounselApiClient,
    poller::{PollOptions, Subscription, subscribe},
};

/// Orders appointments by date, then time.
pub fn appointments_view(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    sort_by_schedule(&mut appointments);
    appointments
}

/// Normalises legacy `HH.mm` times and orders slots by time.
pub fn slots_view(mut slots: Vec<Slot>) -> Vec<Slot> {
    sort_by_time(&mut slots);
    slots
}

/// Merges a student's notifications into the global stream. The category
/// filter applies to the global items only.
pub fn notifications_view(
    global: &[FeedItem],
    notifications: &[Notification],
    filter_category: Option<&str>,
) -> Vec<FeedItem> {
    let owned: Vec<FeedItem> = notifications
        .iter()
        .map(Notification::to_feed_item)
        .collect();
    merge_streams(global, &owned, filter_category)
}

pub fn watch_appointments<D, R>(
    client: CounselApiClient,
    counsellor_id: impl Into<String>,
    options: PollOptions,
    on_data: D,
    on_error: R,
) -> Subscription
where
    D: FnMut(Vec<Appointment>) + Send + 'static,
    R: FnMut(CounselError) + Send + 'static,
{
    let counsellor_id = counsellor_id.into();
    subscribe(
        move || {
            let client = client.clone();
            let counsellor_id = counsellor_id.clone();
            async move {
                client
                    .list_appointments(&counsellor_id, None)
                    .await
                    .map(appointments_view)
            }
        },
        on_data,
        on_error,
        options,
    )
}

pub fn watch_slots<D, R>(
    client: CounselApiClient,
    counsellor_id: impl Into<String>,
    date_key: impl Into<String>,
    options: PollOptions,
    on_data: D,
    on_error: R,
) -> Subscription
where
    D: FnMut(Vec<Slot>) + Send + 'static,
    R: FnMut(CounselError) + Send + 'static,
{
    let counsellor_id = counsellor_id.into();
    let date_key = date_key.into();
    subscribe(
        move || {
            let client = client.clone();
            let counsellor_id = counsellor_id.clone();
            let date_key = date_key.clone();
            async move {
                client
                    .list_slots(&counsellor_id, &date_key)
                    .await
                    .map(slots_view)
            }
        },
        on_data,
        on_error,
        options,
    )
}

/// `on_data` receives `None` until a note has been written.
pub fn watch_note<D, R>(
    client: CounselApiClient,
    appointment_id: Uuid,
    counsellor_id: impl Into<String>,
    options: PollOptions,
    on_data: D,
    on_error: R,
) -> Subscription
where
    D: FnMut(Option<Note>) + Send + 'static,
    R: FnMut(CounselError) + Send + 'static,
{
    let counsellor_id = counsellor_id.into();
    subscribe(
        move || {
            let client = client.clone();
            let counsellor_id = counsellor_id.clone();
            async move { client.get_note(appointment_id, &counsellor_id).await }
        },
        on_data,
        on_error,
        options,
    )
}

/// Polls a student's notifications and hands `on_data` the merged feed.
pub fn watch_notifications<D, R>(
    client: CounselApiClient,
    student_id: impl Into<String>,
    global: Vec<FeedItem>,
    filter_category: Option<String>,
    options: PollOptions,
    on_data: D,
    on_error: R,
) -> Subscription
where
    D: FnMut(Vec<FeedItem>) + Send + 'static,
    R: FnMut(CounselError) + Send + 'static,
{
    let student_id = student_id.into();
    let global = Arc::new(global);
    subscribe(
        move || {
            let client = client.clone();
            let student_id = student_id.clone();
            let global = Arc::clone(&global);
            let filter_category = filter_category.clone();
            async move {
                let notifications = client.list_notifications(&student_id, None).await?;
                Ok::<_, CounselError>(notifications_view(
                    &global,
                    &notifications,
                    filter_category.as_deref(),
                ))
            }
        },
        on_data,
        on_error,
        options,
    )
}
