use chrono::Utc;
use uuid::Uuid;

use crate::errors::{CounselResult, require_field};
use crate::models::note::Note;
use crate::store::DocumentStore;

pub async fn get_note<S>(
    store: &S,
    appointment_id: Uuid,
    counsellor_id: &str,
) -> CounselResult<Option<Note>>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    Ok(store.get_note(appointment_id, counsellor_id).await?)
}

/// Replaces the counsellor's note on an appointment.
pub async fn put_note<S>(
    store: &S,
    appointment_id: Uuid,
    counsellor_id: &str,
    text: &str,
) -> CounselResult<Note>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;

    let note = Note {
        appointment_id,
        counsellor_id: counsellor_id.to_string(),
        text: text.to_string(),
        updated_at: Utc::now(),
    };
    Ok(store.put_note(note).await?)
}
