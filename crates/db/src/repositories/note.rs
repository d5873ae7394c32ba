use crate::models::DbNote;
use counselsync_core::models::note::Note;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_note(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
    counsellor_id: &str,
) -> Result<Option<DbNote>> {
    let note = sqlx::query_as::<_, DbNote>(
        r#"
        SELECT appointment_id, counsellor_id, text, updated_at
        FROM appointment_notes
        WHERE appointment_id = $1 AND counsellor_id = $2
        "#,
    )
    .bind(appointment_id)
    .bind(counsellor_id)
    .fetch_optional(pool)
    .await?;

    Ok(note)
}

pub async fn upsert_note(pool: &Pool<Postgres>, note: &Note) -> Result<DbNote> {
    let note = sqlx::query_as::<_, DbNote>(
        r#"
        INSERT INTO appointment_notes (appointment_id, counsellor_id, text, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (appointment_id, counsellor_id)
        DO UPDATE SET text = $3, updated_at = $4
        RETURNING appointment_id, counsellor_id, text, updated_at
        "#,
    )
    .bind(note.appointment_id)
    .bind(&note.counsellor_id)
    .bind(&note.text)
    .bind(note.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(note)
}
