use crate::models::DbNotification;
use counselsync_core::models::notification::Notification;
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};

pub async fn list_notifications(
    pool: &Pool<Postgres>,
    user_id: &str,
    limit: usize,
) -> Result<Vec<DbNotification>> {
    let notifications = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, user_id, kind, title, body, appointment_id, status, created_at, read
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// Inserts a notification. Returns false when the id is already taken.
pub async fn insert_notification(
    conn: &mut PgConnection,
    notification: &Notification,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications
            (id, user_id, kind, title, body, appointment_id, status, created_at, read)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(notification.id)
    .bind(&notification.user_id)
    .bind(notification.kind.as_str())
    .bind(&notification.title)
    .bind(&notification.body)
    .bind(notification.appointment_id)
    .bind(notification.status.map(|status| status.as_str()))
    .bind(notification.created_at)
    .bind(notification.read)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
