use chrono::{Duration, Utc};
use counselsync_client::feeds::{appointments_view, notifications_view, slots_view};
use counselsync_core::models::{
    appointment::{Appointment, AppointmentDetails, AppointmentStatus},
    feed::FeedItem,
    notification::{Notification, STUDENT_SOURCE},
    slot::{Slot, SlotKey},
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn appointment(date_key: &str, time: &str) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        student_id: "s1".to_string(),
        counsellor_id: "c1".to_string(),
        date_key: date_key.to_string(),
        time: time.to_string(),
        status: AppointmentStatus::Confirmed,
        details: AppointmentDetails::default(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_appointments_view_orders_by_date_then_time() {
    let view = appointments_view(vec![
        appointment("2024-05-02", "08:00"),
        appointment("2024-05-01", "13:00"),
        appointment("2024-05-01", "09:30"),
    ]);

    let order: Vec<(&str, &str)> = view
        .iter()
        .map(|a| (a.date_key.as_str(), a.time.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("2024-05-01", "09:30"), ("2024-05-01", "13:00"), ("2024-05-02", "08:00")]
    );
}

#[test]
fn test_slots_view_normalises_legacy_times() {
    let now = Utc::now();
    let view = slots_view(vec![
        Slot::available(&SlotKey::new("c1", "2024-05-01", "14.00"), now),
        Slot::available(&SlotKey::new("c1", "2024-05-01", "09:00"), now),
    ]);

    let times: Vec<&str> = view.iter().map(|slot| slot.time.as_str()).collect();
    assert_eq!(times, vec!["09:00", "14:00"]);
}

#[test]
fn test_notifications_view_merges_into_global_stream() {
    let now = Utc::now();
    let booked = appointment("2024-05-01", "10:00");
    let notifications = vec![
        Notification::completed(&booked, now),
        Notification::status_changed(&booked, AppointmentStatus::Confirmed, now - Duration::hours(2)),
    ];
    let global = vec![
        FeedItem::new("Exam stress tips", "https://example.org/stress", "global")
            .with_category("wellbeing")
            .with_created_at(now - Duration::hours(1)),
        FeedItem::new("Library hours", "https://example.org/library", "global")
            .with_category("campus")
            .with_created_at(now + Duration::hours(1)),
    ];

    let view = notifications_view(&global, &notifications, Some("wellbeing"));

    let order: Vec<(&str, &str)> = view
        .iter()
        .map(|item| (item.title.as_str(), item.source.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Session completed", STUDENT_SOURCE),
            ("Exam stress tips", "global"),
            ("Appointment confirmed", STUDENT_SOURCE),
        ]
    );
}
