use crate::models::{DbRating, DbRatingAggregate};
use counselsync_core::models::rating::{Rating, RatingAggregate};
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

pub async fn get_rating(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbRating>> {
    let rating = sqlx::query_as::<_, DbRating>(
        r#"
        SELECT id, counsellor_id, student_id, appointment_id, stars, created_at
        FROM ratings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rating)
}

/// Inserts a rating. Returns false when a rating with this id exists.
pub async fn insert_rating(conn: &mut PgConnection, rating: &Rating) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO ratings (id, counsellor_id, student_id, appointment_id, stars, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(rating.id)
    .bind(&rating.counsellor_id)
    .bind(&rating.student_id)
    .bind(rating.appointment_id)
    .bind(i16::from(rating.stars))
    .bind(rating.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_aggregate(
    pool: &Pool<Postgres>,
    counsellor_id: &str,
) -> Result<Option<DbRatingAggregate>> {
    let aggregate = sqlx::query_as::<_, DbRatingAggregate>(
        r#"
        SELECT counsellor_id, rating_count, rating_sum, rating, version
        FROM counsellor_ratings
        WHERE counsellor_id = $1
        "#,
    )
    .bind(counsellor_id)
    .fetch_optional(pool)
    .await?;

    Ok(aggregate)
}

pub async fn insert_aggregate(conn: &mut PgConnection, aggregate: &RatingAggregate) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO counsellor_ratings (counsellor_id, rating_count, rating_sum, rating, version)
        VALUES ($1, $2, $3, $4, 1)
        ON CONFLICT (counsellor_id) DO NOTHING
        "#,
    )
    .bind(&aggregate.counsellor_id)
    .bind(aggregate.rating_count)
    .bind(aggregate.rating_sum)
    .bind(aggregate.rating)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn update_aggregate(
    conn: &mut PgConnection,
    aggregate: &RatingAggregate,
    expected_version: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE counsellor_ratings
        SET rating_count = $2, rating_sum = $3, rating = $4, version = version + 1
        WHERE counsellor_id = $1 AND version = $5
        "#,
    )
    .bind(&aggregate.counsellor_id)
    .bind(aggregate.rating_count)
    .bind(aggregate.rating_sum)
    .bind(aggregate.rating)
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
