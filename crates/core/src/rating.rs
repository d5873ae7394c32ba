//! # Rating Aggregator
//!
//! Ratings are write-once records. Each one also bumps the counsellor's
//! running count and sum in the same commit, and the average is recomputed
//! from those two numbers. Nothing else writes the aggregate.
//!
//! When a rating names its appointment, the appointment id doubles as the
//! rating id, which makes a second rating for the same session collide.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{CounselError, CounselResult, require_field};
use crate::models::rating::{Rating, RatingAggregate, SubmitRatingRequest};
use crate::store::{DocumentStore, Expect, WriteBatch, run_transaction};

fn validate_stars(stars: f64) -> CounselResult<u8> {
    if stars.fract() != 0.0 || !(1.0..=5.0).contains(&stars) {
        return Err(CounselError::InvalidPayload(
            "stars must be an integer between 1 and 5".to_string(),
        ));
    }
    Ok(stars as u8)
}

/// Records one rating and returns the counsellor's updated totals.
pub async fn submit_rating<S>(
    store: &S,
    request: &SubmitRatingRequest,
) -> CounselResult<RatingAggregate>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", &request.counsellor_id)?;
    require_field("studentId", &request.student_id)?;
    let stars = validate_stars(request.stars)?;

    let counsellor_id = request.counsellor_id.trim();
    let student_id = request.student_id.trim();
    let appointment_id = request.appointment_id;
    let rating_id = appointment_id.unwrap_or_else(Uuid::new_v4);

    let aggregate = run_transaction(store, "submit_rating", || async move {
        if let Some(appointment_id) = appointment_id {
            if store.get_rating(appointment_id).await?.is_some() {
                return Err(CounselError::DuplicateRating(appointment_id));
            }
        }

        let (aggregate, expect) = match store.get_aggregate(counsellor_id).await? {
            Some(current) => (current.value.record(stars), current.expect()),
            None => (RatingAggregate::empty(counsellor_id).record(stars), Expect::Absent),
        };

        let rating = Rating {
            id: rating_id,
            counsellor_id: counsellor_id.to_string(),
            student_id: student_id.to_string(),
            appointment_id,
            stars,
            created_at: Utc::now(),
        };

        let batch = WriteBatch::new()
            .insert_rating(rating)
            .put_aggregate(aggregate.clone(), expect);
        Ok((batch, aggregate))
    })
    .await?;

    info!(
        counsellor_id,
        rating_count = aggregate.rating_count,
        rating = aggregate.rating,
        "Rating recorded"
    );
    Ok(aggregate)
}

/// Current totals for a counsellor; zeros when nobody has rated yet.
pub async fn get_rating_summary<S>(store: &S, counsellor_id: &str) -> CounselResult<RatingAggregate>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;

    Ok(store
        .get_aggregate(counsellor_id)
        .await?
        .map(|current| current.value)
        .unwrap_or_else(|| RatingAggregate::empty(counsellor_id)))
}
