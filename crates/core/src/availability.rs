//! Counsellor-side slot maintenance. Writes use the date key exactly as given;
//! the alternate notation is only consulted when booking.

use chrono::Utc;
use tracing::debug;

use crate::date_key;
use crate::errors::{CounselResult, require_field};
use crate::models::slot::{Slot, SlotKey, sort_by_time};
use crate::store::{DocumentStore, Expect, WriteBatch, run_transaction};

fn slot_key(counsellor_id: &str, date_key: &str, time: &str) -> CounselResult<SlotKey> {
    require_field("counsellorId", counsellor_id)?;
    require_field("dateKey", date_key)?;
    require_field("time", time)?;
    Ok(SlotKey::new(
        counsellor_id.trim(),
        date_key.trim(),
        date_key::normalize_time(time),
    ))
}

/// Offers a slot. An existing slot is re-activated but keeps its booking.
pub async fn upsert_slot<S>(
    store: &S,
    counsellor_id: &str,
    date_key: &str,
    time: &str,
) -> CounselResult<Slot>
where
    S: DocumentStore + ?Sized,
{
    let key = slot_key(counsellor_id, date_key, time)?;
    let key = &key;

    let slot = run_transaction(store, "upsert_slot", || async move {
        let now = Utc::now();
        match store.get_slot(key).await? {
            None => {
                let slot = Slot::available(key, now);
                Ok((WriteBatch::new().put_slot(slot.clone(), Expect::Absent), slot))
            }
            Some(current) if current.value.active => Ok((WriteBatch::new(), current.value)),
            Some(current) => {
                let mut slot = current.value.clone();
                slot.active = true;
                slot.updated_at = now;
                Ok((WriteBatch::new().put_slot(slot.clone(), current.expect()), slot))
            }
        }
    })
    .await?;

    debug!(slot = %key, "Slot offered");
    Ok(slot)
}

/// Shows or hides a slot, creating it unbooked when it does not exist yet.
pub async fn toggle_slot<S>(
    store: &S,
    counsellor_id: &str,
    date_key: &str,
    time: &str,
    active: bool,
) -> CounselResult<Slot>
where
    S: DocumentStore + ?Sized,
{
    let key = slot_key(counsellor_id, date_key, time)?;
    let key = &key;

    let slot = run_transaction(store, "toggle_slot", || async move {
        let now = Utc::now();
        match store.get_slot(key).await? {
            None => {
                let mut slot = Slot::available(key, now);
                slot.active = active;
                Ok((WriteBatch::new().put_slot(slot.clone(), Expect::Absent), slot))
            }
            Some(current) if current.value.active == active => {
                Ok((WriteBatch::new(), current.value))
            }
            Some(current) => {
                let mut slot = current.value.clone();
                slot.active = active;
                slot.updated_at = now;
                Ok((WriteBatch::new().put_slot(slot.clone(), current.expect()), slot))
            }
        }
    })
    .await?;

    debug!(slot = %key, active, "Slot visibility changed");
    Ok(slot)
}

/// Slots of one counsellor on one date, ordered by time.
pub async fn list_slots<S>(store: &S, counsellor_id: &str, date_key: &str) -> CounselResult<Vec<Slot>>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    require_field("dateKey", date_key)?;

    let mut slots = store.list_slots(counsellor_id.trim(), date_key.trim()).await?;
    sort_by_time(&mut slots);
    Ok(slots)
}
