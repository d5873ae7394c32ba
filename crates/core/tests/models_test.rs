use chrono::Utc;
use fake::{Fake, faker::name::en::Name};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, json, to_string, to_value};
use serde_test::{Token, assert_ser_tokens};
use counselsync_core::models::{
    appointment::{
        Appointment, AppointmentDetails, AppointmentStatus, BookAppointmentRequest,
        sort_by_schedule,
    },
    notification::{Notification, NotificationKind, STUDENT_SOURCE},
    rating::{RatingAggregate, average},
    slot::{Slot, SlotKey, sort_by_time},
};
use uuid::Uuid;

#[test]
fn test_slot_serialization_uses_camel_case() {
    let key = SlotKey::new("counsellor-1", "2024-05-01", "10:00");
    let mut slot = Slot::available(&key, Utc::now());
    let session = Uuid::new_v4();
    slot.book("student-1", session, Utc::now());

    let value = to_value(&slot).expect("Failed to serialize slot");
    assert_eq!(value["counsellorId"], json!("counsellor-1"));
    assert_eq!(value["dateKey"], json!("2024-05-01"));
    assert_eq!(value["bookedBy"], json!("student-1"));
    assert_eq!(value["sessionId"], json!(session.to_string()));

    let deserialized: Slot = serde_json::from_value(value).expect("Failed to deserialize slot");
    assert_eq!(deserialized, slot);
}

#[test]
fn test_slot_release_clears_booking() {
    let key = SlotKey::new("c1", "2024-05-01", "10:00");
    let mut slot = Slot::available(&key, Utc::now());
    let session = Uuid::new_v4();

    slot.book("s1", session, Utc::now());
    assert!(slot.is_held_by(session));
    assert!(!slot.is_held_by(Uuid::new_v4()));

    slot.release(Utc::now());
    assert!(!slot.booked);
    assert_eq!(slot.booked_by, None);
    assert_eq!(slot.session_id, None);
    assert!(!slot.is_held_by(session));
}

#[test]
fn test_sort_by_time_normalizes_legacy_times() {
    let now = Utc::now();
    let mut slots = vec![
        Slot::available(&SlotKey::new("c1", "2024-05-01", "14.00"), now),
        Slot::available(&SlotKey::new("c1", "2024-05-01", "09:30"), now),
    ];
    sort_by_time(&mut slots);

    let times: Vec<_> = slots.iter().map(|s| s.time.as_str()).collect();
    assert_eq!(times, vec!["09:30", "14:00"]);
}

#[rstest]
#[case("pending", AppointmentStatus::Pending)]
#[case("approved", AppointmentStatus::Confirmed)]
#[case("Confirmed", AppointmentStatus::Confirmed)]
#[case("in_progress", AppointmentStatus::Started)]
#[case("completed", AppointmentStatus::Completed)]
#[case("canceled", AppointmentStatus::Cancelled)]
#[case("cancelled", AppointmentStatus::Cancelled)]
fn test_status_parsing_accepts_aliases(#[case] input: &str, #[case] expected: AppointmentStatus) {
    assert_eq!(input.parse::<AppointmentStatus>().unwrap(), expected);
}

#[test]
fn test_status_parsing_rejects_unknown() {
    assert!("rescheduled".parse::<AppointmentStatus>().is_err());
}

#[test]
fn test_status_serializes_lowercase() {
    assert_ser_tokens(
        &AppointmentStatus::Cancelled,
        &[Token::UnitVariant {
            name: "AppointmentStatus",
            variant: "cancelled",
        }],
    );
    let status: AppointmentStatus = from_str("\"approved\"").unwrap();
    assert_eq!(status, AppointmentStatus::Confirmed);
}

#[test]
fn test_book_request_flattens_details() {
    let student_name: String = Name().fake();
    let body = json!({
        "counsellorId": "c1",
        "dateKey": "2024-05-01",
        "time": "10:00",
        "studentId": "s1",
        "studentName": student_name,
        "reason": "exam stress"
    });

    let request: BookAppointmentRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.details.student_name.as_deref(), Some(student_name.as_str()));
    assert_eq!(request.details.reason.as_deref(), Some("exam stress"));
    assert_eq!(request.details.counsellor_name, None);
}

#[test]
fn test_appointment_roundtrip() {
    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        student_id: "s1".to_string(),
        counsellor_id: "c1".to_string(),
        date_key: "2024-05-01".to_string(),
        time: "10:00".to_string(),
        status: AppointmentStatus::Pending,
        details: AppointmentDetails {
            counsellor_name: Some("Dr. Rao".to_string()),
            ..Default::default()
        },
        created_at: now,
        updated_at: now,
    };

    let json = to_string(&appointment).expect("Failed to serialize appointment");
    assert!(json.contains("\"counsellorName\":\"Dr. Rao\""));
    assert!(!json.contains("studentEmail"));

    let deserialized: Appointment = from_str(&json).expect("Failed to deserialize appointment");
    assert_eq!(deserialized, appointment);
}

#[test]
fn test_rating_aggregate_recomputes_average() {
    let aggregate = RatingAggregate::empty("c1").record(5).record(4).record(3);

    assert_eq!(aggregate.rating_count, 3);
    assert_eq!(aggregate.rating_sum, 12);
    assert_eq!(aggregate.rating, 4.0);
}

#[rstest]
#[case(0, 0, 0.0)]
#[case(14, 3, 4.67)]
#[case(10, 3, 3.33)]
#[case(9, 2, 4.5)]
fn test_average_rounds_to_two_decimals(#[case] sum: i64, #[case] count: i64, #[case] expected: f64) {
    assert_eq!(average(sum, count), expected);
}

fn booked(date_key: &str, time: &str) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        student_id: "s1".to_string(),
        counsellor_id: "c1".to_string(),
        date_key: date_key.to_string(),
        time: time.to_string(),
        status: AppointmentStatus::Pending,
        details: AppointmentDetails::default(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_sort_by_schedule_reads_both_date_notations() {
    let mut appointments = vec![
        booked("someday", "09:00"),
        booked("2024-05-03", "08:00"),
        booked("02-05-2024", "11:00"),
        booked("02-05-2024", "09:00"),
        booked("2024-05-01", "10:00"),
    ];
    sort_by_schedule(&mut appointments);

    let schedule: Vec<(&str, &str)> = appointments
        .iter()
        .map(|a| (a.date_key.as_str(), a.time.as_str()))
        .collect();
    assert_eq!(
        schedule,
        vec![
            ("2024-05-01", "10:00"),
            ("02-05-2024", "09:00"),
            ("02-05-2024", "11:00"),
            ("2024-05-03", "08:00"),
            ("someday", "09:00"),
        ]
    );
}

#[test]
fn test_notification_serializes_type_and_camel_case() {
    let appointment = booked("2024-05-01", "10:00");
    let notification =
        Notification::status_changed(&appointment, AppointmentStatus::Confirmed, Utc::now());

    let value = to_value(&notification).expect("Failed to serialize notification");
    assert_eq!(value["type"], json!("appointment_status"));
    assert_eq!(value["userId"], json!("s1"));
    assert_eq!(value["appointmentId"], json!(appointment.id.to_string()));
    assert_eq!(value["title"], json!("Appointment confirmed"));
    assert_eq!(value["status"], json!("confirmed"));
    assert_eq!(value["read"], json!(false));

    let deserialized: Notification =
        serde_json::from_value(value).expect("Failed to deserialize notification");
    assert_eq!(deserialized, notification);
}

#[test]
fn test_deleted_notification_has_no_status() {
    let appointment = booked("01-05-2024", "10:00");
    let notification = Notification::deleted(&appointment, Utc::now());

    assert_eq!(notification.kind, NotificationKind::AppointmentDeleted);
    assert_eq!(notification.body, "Your session on 01-05-2024 at 10:00 was cancelled.");
    assert!(!to_string(&notification).unwrap().contains("\"status\""));
}

#[test]
fn test_notification_feed_item_is_tagged_by_kind() {
    let appointment = booked("2024-05-01", "10:00");
    let notification = Notification::completed(&appointment, Utc::now());

    let item = notification.to_feed_item();
    assert_eq!(item.source, STUDENT_SOURCE);
    assert_eq!(item.title, "Session completed");
    assert_eq!(item.category.as_deref(), Some("appointment_completed"));
    assert_eq!(item.created_at, Some(notification.created_at));
    assert!(item.url.contains(&notification.id.to_string()));
}
