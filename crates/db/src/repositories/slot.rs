use crate::models::DbSlot;
use counselsync_core::models::slot::{Slot, SlotKey};
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};

pub async fn get_slot(pool: &Pool<Postgres>, key: &SlotKey) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT counsellor_id, date_key, time, booked, booked_by, session_id, active, version, updated_at
        FROM availability_slots
        WHERE counsellor_id = $1 AND date_key = $2 AND time = $3
        "#,
    )
    .bind(&key.counsellor_id)
    .bind(&key.date_key)
    .bind(&key.time)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn list_slots(
    pool: &Pool<Postgres>,
    counsellor_id: &str,
    date_key: &str,
) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT counsellor_id, date_key, time, booked, booked_by, session_id, active, version, updated_at
        FROM availability_slots
        WHERE counsellor_id = $1 AND date_key = $2
        ORDER BY time ASC
        "#,
    )
    .bind(counsellor_id)
    .bind(date_key)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

/// Inserts a new slot. Returns false when the slot already exists.
pub async fn insert_slot(conn: &mut PgConnection, slot: &Slot) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO availability_slots
            (counsellor_id, date_key, time, booked, booked_by, session_id, active, version, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8)
        ON CONFLICT (counsellor_id, date_key, time) DO NOTHING
        "#,
    )
    .bind(&slot.counsellor_id)
    .bind(&slot.date_key)
    .bind(&slot.time)
    .bind(slot.booked)
    .bind(&slot.booked_by)
    .bind(slot.session_id)
    .bind(slot.active)
    .bind(slot.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites a slot if it is still at `expected_version`.
pub async fn update_slot(conn: &mut PgConnection, slot: &Slot, expected_version: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE availability_slots
        SET booked = $4, booked_by = $5, session_id = $6, active = $7,
            updated_at = $8, version = version + 1
        WHERE counsellor_id = $1 AND date_key = $2 AND time = $3 AND version = $9
        "#,
    )
    .bind(&slot.counsellor_id)
    .bind(&slot.date_key)
    .bind(&slot.time)
    .bind(slot.booked)
    .bind(&slot.booked_by)
    .bind(slot.session_id)
    .bind(slot.active)
    .bind(slot.updated_at)
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
