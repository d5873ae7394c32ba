use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CounselError {
    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Slot already booked: {0}")]
    SlotAlreadyBooked(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Rating already submitted for appointment {0}")]
    DuplicateRating(Uuid),

    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),
}

impl CounselError {
    /// The requested slot is gone or taken; the caller should pick another one.
    pub fn is_booking_conflict(&self) -> bool {
        matches!(
            self,
            CounselError::SlotNotFound(_) | CounselError::SlotAlreadyBooked(_)
        )
    }

    /// Transient infrastructure failure; repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CounselError::TransactionConflict(_) | CounselError::Network(_)
        )
    }
}

pub type CounselResult<T> = Result<T, CounselError>;

/// Rejects an empty required field with [`CounselError::InvalidPayload`].
pub fn require_field(name: &str, value: &str) -> CounselResult<()> {
    if value.trim().is_empty() {
        return Err(CounselError::InvalidPayload(format!("{} is required", name)));
    }
    Ok(())
}
