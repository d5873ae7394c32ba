use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub counsellor_id: String,
    pub student_id: String,
    pub appointment_id: Option<Uuid>,
    pub stars: u8,
    pub created_at: DateTime<Utc>,
}

/// Running rating totals kept on the counsellor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub counsellor_id: String,
    pub rating_count: i64,
    pub rating_sum: i64,
    pub rating: f64,
}

impl RatingAggregate {
    pub fn empty(counsellor_id: impl Into<String>) -> Self {
        Self {
            counsellor_id: counsellor_id.into(),
            rating_count: 0,
            rating_sum: 0,
            rating: 0.0,
        }
    }

    /// Totals after one more rating of `stars`. The average is always derived
    /// from the new sum and count.
    pub fn record(&self, stars: u8) -> Self {
        let rating_count = self.rating_count + 1;
        let rating_sum = self.rating_sum + i64::from(stars);
        Self {
            counsellor_id: self.counsellor_id.clone(),
            rating_count,
            rating_sum,
            rating: average(rating_sum, rating_count),
        }
    }
}

/// `sum / count` rounded to two decimals; zero when nothing was rated.
pub fn average(sum: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    (sum as f64 / count as f64 * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    #[serde(default)]
    pub counsellor_id: String,
    #[serde(default)]
    pub student_id: String,
    pub appointment_id: Option<Uuid>,
    pub stars: f64,
}
