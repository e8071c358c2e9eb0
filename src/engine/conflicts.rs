use super::types::{ConflictInfo, EngineError};
use crate::model::{Booking, BookingStatus};
use crate::timerange::TimeRange;
use chrono_tz::Tz;

/// Réservations bloquantes d'une journée : les confirmées uniquement.
/// Une demande en attente ne réserve pas le créneau, c'est l'approbation
/// qui tranche (deux demandes concurrentes peuvent se chevaucher).
pub(super) fn blocking(bookings: &[Booking]) -> impl Iterator<Item = &Booking> {
    bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
}

/// Cherche les réservations bloquantes chevauchant `candidate`
/// (chevauchement strict : le contact ne compte pas).
pub(super) fn find_overlapping<'a>(
    bookings: &'a [Booking],
    candidate: &TimeRange,
    tz: Tz,
) -> Vec<&'a Booking> {
    let mut found: Vec<&Booking> = blocking(bookings)
        .filter(|b| {
            b.range(tz)
                .map(|r| r.overlaps(candidate))
                .unwrap_or(false)
        })
        .collect();
    found.sort_by_key(|b| b.start_time);
    found
}

pub(super) fn infos(found: &[&Booking]) -> Vec<ConflictInfo> {
    found
        .iter()
        .map(|b| ConflictInfo {
            id: b.id.clone(),
            date: b.date,
            start_time: b.start_time,
            end_time: b.end_time,
        })
        .collect()
}

pub(super) fn conflict_error(found: &[&Booking]) -> EngineError {
    EngineError::Conflict {
        conflicts: infos(found),
    }
}

/// Insertion fusionnante pour les plages d'ouverture : toute entrée qui
/// touche ou chevauche le candidat est absorbée dans une entrée unique
/// (min des débuts, max des fins). Idempotente. À ne jamais employer
/// pour créer une réservation.
pub fn merge_on_insert(ranges: &mut Vec<TimeRange>, candidate: TimeRange) {
    let mut merged = candidate;
    while let Some(pos) = ranges.iter().position(|r| r.touches_or_overlaps(&merged)) {
        let absorbed = ranges.swap_remove(pos);
        merged = merged.union(&absorbed);
    }
    ranges.push(merged);
    ranges.sort_by_key(|r| r.start);
}
