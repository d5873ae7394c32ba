use axum::{body::to_bytes, http::StatusCode};
use counselsync_api::middleware::error_handling::{AppError, map_error};
use counselsync_core::{errors::CounselError, mock::MockStore};
use mockall::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

#[rstest]
#[case(CounselError::SlotNotFound("c1/2024-05-01/10:00".into()), StatusCode::NOT_FOUND)]
#[case(CounselError::NotFound("appointment".into()), StatusCode::NOT_FOUND)]
#[case(CounselError::SlotAlreadyBooked("c1/2024-05-01/10:00".into()), StatusCode::CONFLICT)]
#[case(CounselError::DuplicateRating(Uuid::nil()), StatusCode::CONFLICT)]
#[case(CounselError::InvalidPayload("time is required".into()), StatusCode::BAD_REQUEST)]
#[case(CounselError::Authorization("Not your appointment".into()), StatusCode::FORBIDDEN)]
#[case(CounselError::TransactionConflict("book_slot".into()), StatusCode::SERVICE_UNAVAILABLE)]
#[case(CounselError::Network("connection reset".into()), StatusCode::BAD_GATEWAY)]
#[case(CounselError::Database(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: CounselError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = map_error(CounselError::InvalidPayload("time is required".into()));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        body,
        json!({ "success": false, "error": "Invalid payload: time is required" })
    );
}

#[test]
fn test_eyre_report_becomes_database_error() {
    let AppError(error) = AppError::from(eyre::eyre!("connection refused"));
    assert!(matches!(error, CounselError::Database(_)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_server_error() {
    let mut store = MockStore::new();
    store
        .expect_get_slot()
        .with(predicate::always())
        .returning(|_| Err(eyre::eyre!("connection refused")));

    let app = counselsync_api::build_router(Arc::new(counselsync_api::ApiState::new(Arc::new(
        store,
    ))));
    let server = axum_test::TestServer::new(app).unwrap();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "counsellorId": "c1",
            "dateKey": "2024-05-01",
            "time": "10:00",
            "studentId": "s1"
        }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}
