use super::types::{CreateBookingRequest, EditBookingRequest, EngineError};
use super::{conflicts, Engine};
use crate::model::{Booking, BookingId, BookingStatus};
use crate::storage::BookingStore;
use anyhow::anyhow;

pub(super) fn approve<S: BookingStore>(
    engine: &mut Engine<S>,
    id: &BookingId,
) -> Result<Booking, EngineError> {
    let booking = find(engine, id)?;
    require(&booking, BookingStatus::Pending, "approve")?;

    // Deux demandes concurrentes peuvent se chevaucher en attente :
    // on revérifie contre les confirmées avant de valider celle-ci.
    let day = engine.store.list(Some(booking.date));
    let range = booking
        .range(engine.settings.time_zone)
        .ok_or(EngineError::NonexistentLocalTime {
            date: booking.date,
            time: booking.start_time,
            tz: engine.settings.time_zone.name(),
        })?;
    let found = conflicts::find_overlapping(&day, &range, engine.settings.time_zone);
    if !found.is_empty() {
        return Err(conflicts::conflict_error(&found));
    }

    transition(engine, booking, BookingStatus::Confirmed, None)
}

pub(super) fn reject<S: BookingStore>(
    engine: &mut Engine<S>,
    id: &BookingId,
    reason: &str,
) -> Result<Booking, EngineError> {
    if reason.trim().is_empty() {
        return Err(EngineError::Other(anyhow!(
            "rejection reason is mandatory and surfaced to the requester"
        )));
    }
    let booking = find(engine, id)?;
    require(&booking, BookingStatus::Pending, "reject")?;
    transition(
        engine,
        booking,
        BookingStatus::Rejected,
        Some(reason.trim().to_string()),
    )
}

pub(super) fn cancel<S: BookingStore>(
    engine: &mut Engine<S>,
    id: &BookingId,
) -> Result<Booking, EngineError> {
    let booking = find(engine, id)?;
    if !booking.status.is_live() {
        return Err(EngineError::InvalidTransition {
            from: booking.status,
            action: "cancel",
        });
    }
    transition(engine, booking, BookingStatus::Cancelled, None)
}

/// Modifier = annuler puis recréer : le nouveau créneau repasse par
/// tout le pipeline (validation, conflits, chan), jamais de mutation
/// en place. L'annulation précède la recréation, sinon la fiche
/// d'origine bloquerait son propre remplacement (exclusivité chan
/// sur la même journée) ; en cas d'échec elle est rétablie.
pub(super) fn edit<S: BookingStore>(
    engine: &mut Engine<S>,
    id: &BookingId,
    req: EditBookingRequest,
) -> Result<Booking, EngineError> {
    let old = find(engine, id)?;
    require(&old, BookingStatus::Pending, "edit")?;

    let cancelled = transition(
        engine,
        old.clone(),
        BookingStatus::Cancelled,
        Some("edited".to_string()),
    )?;
    match engine.book(CreateBookingRequest {
        date: req.date,
        start: req.start,
        end: req.end,
        created_by: old.created_by,
        with_chan: old.with_chan,
        force_chan: false,
        note: old.note.clone(),
    }) {
        Ok(replacement) => Ok(replacement),
        Err(err) => {
            transition(engine, cancelled, BookingStatus::Pending, old.status_reason)?;
            Err(err)
        }
    }
}

fn find<S: BookingStore>(engine: &Engine<S>, id: &BookingId) -> Result<Booking, EngineError> {
    engine
        .store
        .list(None)
        .into_iter()
        .find(|b| &b.id == id)
        .ok_or_else(|| EngineError::UnknownBooking(id.as_str().to_string()))
}

fn require(
    booking: &Booking,
    expected: BookingStatus,
    action: &'static str,
) -> Result<(), EngineError> {
    if booking.status != expected {
        return Err(EngineError::InvalidTransition {
            from: booking.status,
            action,
        });
    }
    Ok(())
}

fn transition<S: BookingStore>(
    engine: &mut Engine<S>,
    booking: Booking,
    status: BookingStatus,
    reason: Option<String>,
) -> Result<Booking, EngineError> {
    let mut updated = booking;
    updated.status = status;
    updated.status_reason = reason;

    let day: Vec<Booking> = engine
        .store
        .list(Some(updated.date))
        .into_iter()
        .map(|b| if b.id == updated.id { updated.clone() } else { b })
        .collect();
    engine.store.replace_all_for_date(updated.date, day)?;
    #[cfg(feature = "logging")]
    tracing::debug!(
        id = %updated.id.as_str(),
        status = ?updated.status,
        "booking status changed"
    );
    Ok(updated)
}
