use crate::models::DbAppointment;
use counselsync_core::models::appointment::Appointment;
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

pub async fn get_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, student_id, counsellor_id, date_key, time, status, student_name,
               student_email, counsellor_name, reason, version, created_at, updated_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Appointments of one counsellor in calendar order; both date notations
/// are read as dates.
pub async fn list_appointments(
    pool: &Pool<Postgres>,
    counsellor_id: &str,
    limit: usize,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, student_id, counsellor_id, date_key, time, status, student_name,
               student_email, counsellor_name, reason, version, created_at, updated_at
        FROM appointments
        WHERE counsellor_id = $1
        ORDER BY
            CASE
                WHEN date_key ~ '^\d{4}-\d{2}-\d{2}$' THEN to_date(date_key, 'YYYY-MM-DD')
                WHEN date_key ~ '^\d{2}-\d{2}-\d{4}$' THEN to_date(date_key, 'DD-MM-YYYY')
            END ASC NULLS LAST,
            date_key ASC,
            time ASC
        LIMIT $2
        "#,
    )
    .bind(counsellor_id)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Inserts a new appointment. Returns false when the id is already taken.
pub async fn insert_appointment(conn: &mut PgConnection, appointment: &Appointment) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO appointments
            (id, student_id, counsellor_id, date_key, time, status, student_name,
             student_email, counsellor_name, reason, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1, $11, $12)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(appointment.id)
    .bind(&appointment.student_id)
    .bind(&appointment.counsellor_id)
    .bind(&appointment.date_key)
    .bind(&appointment.time)
    .bind(appointment.status.as_str())
    .bind(&appointment.details.student_name)
    .bind(&appointment.details.student_email)
    .bind(&appointment.details.counsellor_name)
    .bind(&appointment.details.reason)
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Overwrites an appointment if it is still at `expected_version`.
pub async fn update_appointment(
    conn: &mut PgConnection,
    appointment: &Appointment,
    expected_version: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET date_key = $2, time = $3, status = $4, updated_at = $5, version = version + 1
        WHERE id = $1 AND version = $6
        "#,
    )
    .bind(appointment.id)
    .bind(&appointment.date_key)
    .bind(&appointment.time)
    .bind(appointment.status.as_str())
    .bind(appointment.updated_at)
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn delete_appointment(conn: &mut PgConnection, id: Uuid, expected_version: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(id)
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
