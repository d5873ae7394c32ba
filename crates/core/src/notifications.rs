use crate::errors::{CounselResult, require_field};
use crate::models::notification::Notification;
use crate::store::DocumentStore;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

/// A student's notifications, newest first.
pub async fn list_notifications<S>(
    store: &S,
    student_id: &str,
    limit: Option<usize>,
) -> CounselResult<Vec<Notification>>
where
    S: DocumentStore + ?Sized,
{
    require_field("studentId", student_id)?;

    let limit = limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
    let mut notifications = store.list_notifications(student_id.trim(), limit).await?;
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(notifications)
}
