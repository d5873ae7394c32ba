use rstest::rstest;
use counselsync_core::errors::{CounselError, CounselResult, require_field};
use uuid::Uuid;

#[test]
fn test_counsel_error_display() {
    let not_found = CounselError::SlotNotFound("c1/2024-05-01/10:00".to_string());
    let booked = CounselError::SlotAlreadyBooked("c1/2024-05-01/10:00".to_string());
    let invalid = CounselError::InvalidPayload("stars is required".to_string());
    let id = Uuid::nil();
    let duplicate = CounselError::DuplicateRating(id);
    let database = CounselError::Database(eyre::eyre!("Connection refused"));

    assert_eq!(not_found.to_string(), "Slot not found: c1/2024-05-01/10:00");
    assert_eq!(booked.to_string(), "Slot already booked: c1/2024-05-01/10:00");
    assert_eq!(invalid.to_string(), "Invalid payload: stars is required");
    assert_eq!(
        duplicate.to_string(),
        format!("Rating already submitted for appointment {}", id)
    );
    assert!(database.to_string().contains("Database error:"));
}

#[rstest]
#[case(CounselError::SlotNotFound("x".into()), true, false)]
#[case(CounselError::SlotAlreadyBooked("x".into()), true, false)]
#[case(CounselError::TransactionConflict("x".into()), false, true)]
#[case(CounselError::Network("x".into()), false, true)]
#[case(CounselError::InvalidPayload("x".into()), false, false)]
#[case(CounselError::Database(eyre::eyre!("x")), false, false)]
fn test_error_classification(
    #[case] error: CounselError,
    #[case] booking_conflict: bool,
    #[case] retryable: bool,
) {
    assert_eq!(error.is_booking_conflict(), booking_conflict);
    assert_eq!(error.is_retryable(), retryable);
}

#[test]
fn test_eyre_conversion() {
    fn load() -> CounselResult<()> {
        let failed: eyre::Result<()> = Err(eyre::eyre!("pool timed out"));
        failed?;
        Ok(())
    }

    let err = load().unwrap_err();
    assert!(matches!(err, CounselError::Database(_)));
    assert!(err.to_string().contains("pool timed out"));
}

#[test]
fn test_require_field() {
    assert!(require_field("counsellorId", "c1").is_ok());

    let err = require_field("counsellorId", "   ").unwrap_err();
    assert_eq!(err.to_string(), "Invalid payload: counsellorId is required");
}
