//! # Booking Transaction Engine
//!
//! Books counsellor slots and moves appointments through their lifecycle.
//! Every operation here reads the records it depends on, decides, and submits
//! one [`WriteBatch`] through [`run_transaction`], so the appointment record
//! and the slot it occupies always change together.
//!
//! A slot is held by an appointment when `booked` is set and its `session_id`
//! is the appointment id. Releasing clears both; only the holder can release.
//!
//! Status changes, completion and deletion also append a [`Notification`] for
//! the student to the batch of the change they report.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::date_key;
use crate::errors::{CounselError, CounselResult, require_field};
use crate::models::{
    appointment::{Appointment, AppointmentDetails, AppointmentStatus, sort_by_schedule},
    notification::Notification,
    slot::{Slot, SlotKey},
};
use crate::store::{DocumentStore, Expect, Versioned, WriteBatch, run_transaction};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_APPOINTMENT_LIMIT: usize = 100;

/// Looks a slot up under the date key as given, then under its alternate
/// notation. The first record found is the one the transaction works on.
pub async fn find_slot<S>(
    store: &S,
    counsellor_id: &str,
    date_key: &str,
    time: &str,
) -> CounselResult<Option<Versioned<Slot>>>
where
    S: DocumentStore + ?Sized,
{
    for candidate in date_key::candidates(date_key) {
        let key = SlotKey::new(counsellor_id, candidate, time);
        if let Some(found) = store.get_slot(&key).await? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Finds a slot that can be offered to a student: present and active.
async fn find_offered_slot<S>(
    store: &S,
    counsellor_id: &str,
    date_key: &str,
    time: &str,
) -> CounselResult<Versioned<Slot>>
where
    S: DocumentStore + ?Sized,
{
    find_slot(store, counsellor_id, date_key, time)
        .await?
        .filter(|slot| slot.value.active)
        .ok_or_else(|| {
            CounselError::SlotNotFound(format!("{}/{}/{}", counsellor_id, date_key, time))
        })
}

/// Books the slot `(counsellor_id, date_key, time)` for `requester`.
///
/// Creates a `pending` appointment and marks the slot as booked by it in the
/// same commit. Under concurrent callers at most one succeeds; the others see
/// [`CounselError::SlotAlreadyBooked`] once the winner has committed.
pub async fn book_slot<S>(
    store: &S,
    counsellor_id: &str,
    date_key: &str,
    time: &str,
    requester: &str,
    details: &AppointmentDetails,
) -> CounselResult<Uuid>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    require_field("dateKey", date_key)?;
    require_field("time", time)?;
    require_field("studentId", requester)?;

    let counsellor_id = counsellor_id.trim();
    let requester = requester.trim();
    let time = date_key::normalize_time(time);
    let time = time.as_str();

    let appointment_id = run_transaction(store, "book_slot", || async move {
        let current = find_offered_slot(store, counsellor_id, date_key, time).await?;
        if current.value.booked {
            return Err(CounselError::SlotAlreadyBooked(current.value.key().to_string()));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            student_id: requester.to_string(),
            counsellor_id: counsellor_id.to_string(),
            // The key the slot was actually found under, so releases find it again
            date_key: current.value.date_key.clone(),
            time: current.value.time.clone(),
            status: AppointmentStatus::Pending,
            details: details.clone(),
            created_at: now,
            updated_at: now,
        };
        let id = appointment.id;

        let mut slot = current.value.clone();
        slot.book(requester, id, now);

        let batch = WriteBatch::new()
            .put_appointment(appointment, Expect::Absent)
            .put_slot(slot, current.expect());
        Ok((batch, id))
    })
    .await?;

    info!(%appointment_id, counsellor_id, date_key, time, "Slot booked");
    Ok(appointment_id)
}

/// Loads an appointment and checks it belongs to `counsellor_id`.
async fn load_owned<S>(
    store: &S,
    id: Uuid,
    counsellor_id: &str,
) -> CounselResult<Versioned<Appointment>>
where
    S: DocumentStore + ?Sized,
{
    let current = store
        .get_appointment(id)
        .await?
        .ok_or_else(|| CounselError::NotFound(format!("Appointment with ID {} not found", id)))?;

    if current.value.counsellor_id != counsellor_id {
        return Err(CounselError::Authorization("Not your appointment".to_string()));
    }
    Ok(current)
}

/// Adds the release of the slot held by `appointment` to `batch`. Slots that
/// are missing or held by someone else are left alone.
async fn release_held_slot<S>(
    store: &S,
    appointment: &Appointment,
    batch: WriteBatch,
    now: DateTime<Utc>,
) -> CounselResult<WriteBatch>
where
    S: DocumentStore + ?Sized,
{
    let held = find_slot(
        store,
        &appointment.counsellor_id,
        &appointment.date_key,
        &appointment.time,
    )
    .await?;

    match held {
        Some(current) if current.value.is_held_by(appointment.id) => {
            let mut slot = current.value.clone();
            slot.release(now);
            Ok(batch.put_slot(slot, current.expect()))
        }
        _ => Ok(batch),
    }
}

async fn transition<S>(
    store: &S,
    id: Uuid,
    counsellor_id: &str,
    status: AppointmentStatus,
) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    let counsellor_id = counsellor_id.trim();

    run_transaction(store, "appointment_transition", || async move {
        let current = load_owned(store, id, counsellor_id).await?;
        if current.value.status == status {
            return Ok((WriteBatch::new(), ()));
        }
        if current.value.status.is_cancelled() {
            return Err(CounselError::InvalidPayload(
                "Cancelled appointments cannot be reopened".to_string(),
            ));
        }
        if current.value.status.is_completed() {
            return Err(CounselError::InvalidPayload(format!(
                "Completed appointments cannot be moved to {}",
                status
            )));
        }

        let now = Utc::now();
        let mut appointment = current.value.clone();
        appointment.status = status;
        appointment.updated_at = now;

        let mut batch = WriteBatch::new();
        if status.is_cancelled() {
            batch = release_held_slot(store, &current.value, batch, now).await?;
        }
        // Starting a session is not announced to the student
        let notification = match status {
            AppointmentStatus::Started => None,
            AppointmentStatus::Completed => Some(Notification::completed(&appointment, now)),
            status => Some(Notification::status_changed(&appointment, status, now)),
        };
        if let Some(notification) = notification {
            batch = batch.insert_notification(notification);
        }
        Ok((batch.put_appointment(appointment, current.expect()), ()))
    })
    .await?;

    info!(%id, counsellor_id, %status, "Appointment status updated");
    Ok(())
}

/// Status change requested by a counsellor: `pending`, `confirmed` or
/// `cancelled`. Cancelling releases the slot in the same commit. Cancelled and
/// completed appointments keep their status.
pub async fn update_status<S>(
    store: &S,
    id: Uuid,
    counsellor_id: &str,
    status: AppointmentStatus,
) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    match status {
        AppointmentStatus::Pending
        | AppointmentStatus::Confirmed
        | AppointmentStatus::Cancelled => transition(store, id, counsellor_id, status).await,
        other => Err(CounselError::InvalidPayload(format!("Invalid status: {}", other))),
    }
}

pub async fn cancel_appointment<S>(store: &S, id: Uuid, counsellor_id: &str) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    transition(store, id, counsellor_id, AppointmentStatus::Cancelled).await
}

pub async fn start_appointment<S>(store: &S, id: Uuid, counsellor_id: &str) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    transition(store, id, counsellor_id, AppointmentStatus::Started).await
}

pub async fn complete_appointment<S>(store: &S, id: Uuid, counsellor_id: &str) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    transition(store, id, counsellor_id, AppointmentStatus::Completed).await
}

/// Moves an appointment to another slot: the old slot is released and the new
/// one booked in a single commit.
pub async fn reschedule_appointment<S>(
    store: &S,
    id: Uuid,
    counsellor_id: &str,
    new_date_key: &str,
    new_time: &str,
) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    require_field("appointmentDate", new_date_key)?;
    require_field("appointmentTime", new_time)?;

    let counsellor_id = counsellor_id.trim();
    let new_time = date_key::normalize_time(new_time);
    let new_time = new_time.as_str();

    run_transaction(store, "reschedule_appointment", || async move {
        let current = load_owned(store, id, counsellor_id).await?;
        if current.value.status.is_cancelled() {
            return Err(CounselError::InvalidPayload(
                "Cancelled appointments cannot be rescheduled".to_string(),
            ));
        }
        if current.value.status.is_completed() {
            return Err(CounselError::InvalidPayload(
                "Completed appointments cannot be rescheduled".to_string(),
            ));
        }

        let target = find_offered_slot(store, counsellor_id, new_date_key, new_time).await?;
        if target.value.is_held_by(id) {
            return Ok((WriteBatch::new(), ()));
        }
        if target.value.booked {
            return Err(CounselError::SlotAlreadyBooked(target.value.key().to_string()));
        }

        let now = Utc::now();
        let batch = release_held_slot(store, &current.value, WriteBatch::new(), now).await?;

        let mut slot = target.value.clone();
        slot.book(&current.value.student_id, id, now);

        let mut appointment = current.value.clone();
        appointment.date_key = target.value.date_key.clone();
        appointment.time = target.value.time.clone();
        appointment.updated_at = now;

        let batch = batch
            .put_slot(slot, target.expect())
            .put_appointment(appointment, current.expect());
        Ok((batch, ()))
    })
    .await?;

    info!(%id, counsellor_id, new_date_key, new_time, "Appointment rescheduled");
    Ok(())
}

/// Removes an appointment, frees its slot and tells the student. Deleting an
/// appointment that no longer exists succeeds.
pub async fn delete_appointment<S>(store: &S, id: Uuid, counsellor_id: &str) -> CounselResult<()>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;
    let counsellor_id = counsellor_id.trim();

    run_transaction(store, "delete_appointment", || async move {
        let current = match store.get_appointment(id).await? {
            Some(current) => current,
            None => return Ok((WriteBatch::new(), ())),
        };
        if current.value.counsellor_id != counsellor_id {
            return Err(CounselError::Authorization("Not your appointment".to_string()));
        }

        let now = Utc::now();
        let batch = release_held_slot(store, &current.value, WriteBatch::new(), now).await?;
        let batch = batch
            .insert_notification(Notification::deleted(&current.value, now))
            .delete_appointment(id, current.expect());
        Ok((batch, ()))
    })
    .await?;

    info!(%id, counsellor_id, "Appointment deleted");
    Ok(())
}

/// Appointments of one counsellor ordered by date and time.
pub async fn list_appointments<S>(
    store: &S,
    counsellor_id: &str,
    limit: Option<usize>,
) -> CounselResult<Vec<Appointment>>
where
    S: DocumentStore + ?Sized,
{
    require_field("counsellorId", counsellor_id)?;

    let limit = limit.unwrap_or(DEFAULT_APPOINTMENT_LIMIT);
    let mut appointments = store.list_appointments(counsellor_id.trim(), limit).await?;
    sort_by_schedule(&mut appointments);
    Ok(appointments)
}
