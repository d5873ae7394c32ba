use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use counselsync_api::{ApiState, build_router};
use counselsync_core::{
    models::{
        appointment::{AppointmentListResponse, AppointmentStatus, BookAppointmentResponse},
        note::NoteResponse,
        notification::{NotificationKind, NotificationListResponse},
        rating::RatingAggregate,
        slot::SlotListResponse,
    },
    store::DocumentStore,
};
use counselsync_db::MemoryStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

const COUNSELLOR: &str = "counsellor-1";

fn server_with(store: Arc<dyn DocumentStore>) -> TestServer {
    let app = build_router(Arc::new(ApiState::new(store)));
    TestServer::new(app).expect("test server starts")
}

fn server() -> TestServer {
    server_with(Arc::new(MemoryStore::new()))
}

async fn offer_slot(server: &TestServer, date_key: &str, time: &str) {
    server
        .post("/api/counsellor/availability/slot")
        .json(&json!({ "counsellorId": COUNSELLOR, "dateKey": date_key, "time": time }))
        .expect_success()
        .await;
}

async fn book(server: &TestServer, date_key: &str, time: &str, student: &str) -> Uuid {
    let response = server
        .post("/api/appointments")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "dateKey": date_key,
            "time": time,
            "studentId": student,
            "studentName": "Ada",
            "reason": "exam stress"
        }))
        .expect_success()
        .await;
    response.json::<BookAppointmentResponse>().appointment_id
}

async fn appointments(server: &TestServer) -> AppointmentListResponse {
    server
        .get("/api/counsellor/appointments")
        .add_query_param("counsellorId", COUNSELLOR)
        .expect_success()
        .await
        .json::<AppointmentListResponse>()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let response = server().get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "success": true, "status": "ok" }));
}

#[tokio::test]
async fn test_offered_slot_is_listed_and_bookable() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;

    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    let slots = server
        .get("/api/counsellor/availability")
        .add_query_param("counsellorId", COUNSELLOR)
        .add_query_param("dateKey", "2024-05-01")
        .expect_success()
        .await
        .json::<SlotListResponse>();
    assert_eq!(slots.slots.len(), 1);
    assert!(slots.slots[0].is_held_by(id));

    let listed = appointments(&server).await;
    assert_eq!(listed.appointments.len(), 1);
    assert_eq!(listed.appointments[0].status, AppointmentStatus::Pending);
    assert_eq!(listed.appointments[0].details.reason.as_deref(), Some("exam stress"));
}

#[tokio::test]
async fn test_second_booking_of_slot_is_rejected() {
    let server = server();
    offer_slot(&server, "01-05-2024", "10:00").await;
    book(&server, "2024-05-01", "10:00", "student-1").await;

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "dateKey": "01-05-2024",
            "time": "10:00",
            "studentId": "student-2"
        }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap_or_default().contains("already booked"));
}

#[tokio::test]
async fn test_booking_unknown_slot_is_not_found() {
    let response = server()
        .post("/api/appointments")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "dateKey": "2024-05-01",
            "time": "10:00",
            "studentId": "student-1"
        }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hidden_slot_cannot_be_booked() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;

    server
        .patch("/api/counsellor/availability/toggle")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "dateKey": "2024-05-01",
            "time": "10:00",
            "active": false
        }))
        .expect_success()
        .await;

    server
        .post("/api/appointments")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "dateKey": "2024-05-01",
            "time": "10:00",
            "studentId": "student-1"
        }))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_cancel_frees_slot() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/status", id))
        .json(&json!({ "status": "canceled", "counsellorId": COUNSELLOR }))
        .expect_success()
        .await
        .assert_json(&json!({ "success": true }));

    let listed = appointments(&server).await;
    assert_eq!(listed.appointments[0].status, AppointmentStatus::Cancelled);

    book(&server, "2024-05-01", "10:00", "student-2").await;
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/status", id))
        .json(&json!({ "status": "archived", "counsellorId": COUNSELLOR }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_counsellor_is_forbidden() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/start", id))
        .json(&json!({ "counsellorId": "counsellor-2" }))
        .expect_failure()
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_session_runs_through_start_and_complete() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    for action in ["start", "complete"] {
        server
            .patch(&format!("/api/counsellor/appointments/{}/{}", id, action))
            .json(&json!({ "counsellorId": COUNSELLOR }))
            .expect_success()
            .await;
    }

    let listed = appointments(&server).await;
    assert_eq!(listed.appointments[0].status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_completed_session_cannot_be_reopened() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/complete", id))
        .json(&json!({ "counsellorId": COUNSELLOR }))
        .expect_success()
        .await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/status", id))
        .json(&json!({ "status": "pending", "counsellorId": COUNSELLOR }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_student_reads_lifecycle_notifications() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/status", id))
        .json(&json!({ "status": "approved", "counsellorId": COUNSELLOR }))
        .expect_success()
        .await;
    server
        .delete(&format!("/api/counsellor/appointments/{}", id))
        .json(&json!({ "counsellorId": COUNSELLOR }))
        .expect_success()
        .await;

    let listed = server
        .get("/api/notifications")
        .add_query_param("studentId", "student-1")
        .expect_success()
        .await
        .json::<NotificationListResponse>();
    assert_eq!(listed.notifications.len(), 2);
    assert!(listed.notifications.iter().all(|n| n.appointment_id == id));
    assert!(
        listed
            .notifications
            .iter()
            .any(|n| n.kind == NotificationKind::AppointmentDeleted)
    );

    let limited = server
        .get("/api/notifications")
        .add_query_param("studentId", "student-1")
        .add_query_param("limit", "1")
        .expect_success()
        .await
        .json::<NotificationListResponse>();
    assert_eq!(limited.notifications.len(), 1);

    server
        .get("/api/notifications")
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reschedule_moves_to_new_slot() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    offer_slot(&server, "2024-05-03", "15:30").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    server
        .patch(&format!("/api/counsellor/appointments/{}/reschedule", id))
        .json(&json!({
            "appointmentDate": "2024-05-03",
            "appointmentTime": "15.30",
            "counsellorId": COUNSELLOR
        }))
        .expect_success()
        .await;

    let listed = appointments(&server).await;
    assert_eq!(listed.appointments[0].date_key, "2024-05-03");
    assert_eq!(listed.appointments[0].time, "15:30");

    // The old slot is free again
    book(&server, "2024-05-01", "10:00", "student-2").await;
}

#[tokio::test]
async fn test_delete_is_repeatable() {
    let server = server();
    offer_slot(&server, "2024-05-01", "10:00").await;
    let id = book(&server, "2024-05-01", "10:00", "student-1").await;

    for _ in 0..2 {
        server
            .delete(&format!("/api/counsellor/appointments/{}", id))
            .json(&json!({ "counsellorId": COUNSELLOR }))
            .expect_success()
            .await;
    }

    assert!(appointments(&server).await.appointments.is_empty());
}

#[tokio::test]
async fn test_malformed_appointment_id_is_bad_request() {
    server()
        .patch("/api/counsellor/appointments/not-a-uuid/start")
        .json(&json!({ "counsellorId": COUNSELLOR }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_counsellor_id_is_bad_request() {
    let response = server()
        .get("/api/counsellor/appointments")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[tokio::test]
async fn test_notes_round_trip() {
    let server = server();
    let appointment_id = Uuid::new_v4();
    let path = format!("/api/counsellor/appointments/{}/notes/{}", appointment_id, COUNSELLOR);

    let empty = server.get(&path).expect_success().await.json::<NoteResponse>();
    assert!(empty.note.is_none());

    server
        .put(&path)
        .json(&json!({ "text": "Follow up next week" }))
        .expect_success()
        .await;

    let saved = server.get(&path).expect_success().await.json::<NoteResponse>();
    assert_eq!(
        saved.note.map(|note| note.text),
        Some("Follow up next week".to_string())
    );
}

#[tokio::test]
async fn test_ratings_aggregate_and_reject_duplicates() {
    let server = server();
    let first_appointment = Uuid::new_v4();

    for (appointment_id, stars) in [(first_appointment, 5), (Uuid::new_v4(), 4), (Uuid::new_v4(), 3)] {
        server
            .post("/api/ratings")
            .json(&json!({
                "counsellorId": COUNSELLOR,
                "studentId": "student-1",
                "appointmentId": appointment_id,
                "stars": stars
            }))
            .expect_success()
            .await;
    }

    server
        .post("/api/ratings")
        .json(&json!({
            "counsellorId": COUNSELLOR,
            "studentId": "student-1",
            "appointmentId": first_appointment,
            "stars": 1
        }))
        .expect_failure()
        .await
        .assert_status(StatusCode::CONFLICT);

    let summary = server
        .get(&format!("/api/ratings/{}", COUNSELLOR))
        .expect_success()
        .await
        .json::<RatingAggregate>();
    assert_eq!(summary.rating_count, 3);
    assert_eq!(summary.rating_sum, 12);
    assert_eq!(summary.rating, 4.0);
}

#[tokio::test]
async fn test_out_of_range_stars_are_rejected() {
    server()
        .post("/api/ratings")
        .json(&json!({ "counsellorId": COUNSELLOR, "studentId": "s1", "stars": 4.5 }))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
