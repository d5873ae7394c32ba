pub mod appointment;
pub mod feed;
pub mod note;
pub mod notification;
pub mod rating;
pub mod slot;

use serde::{Deserialize, Serialize};

/// Acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
