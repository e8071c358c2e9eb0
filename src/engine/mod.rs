mod chan;
mod conflicts;
mod freetime;
mod lifecycle;
mod types;
mod validate;

pub use chan::{is_chan_eligible, ChanEligibility, ChanPolicy, HeatingGapPolicy, TimeOfDayPolicy};
pub use conflicts::merge_on_insert;
pub use freetime::{check_gaps, classify_day, free_ranges, CellStatus, DaySegment};
pub use types::{
    ChanDenial, ConflictInfo, CreateBookingRequest, EditBookingRequest, EngineError,
    ReplaceBookingRequest,
};
pub use validate::ValidatedSlot;

use crate::model::{Booking, BookingId, BookingStatus, ScheduleSettings};
use crate::storage::BookingStore;
use crate::timerange::{self, TimeRange, WallTime};
use chrono::{NaiveDate, Utc};

/// Conflits constatés à un instant donné, avec la révision du store
/// à ce moment-là. `replace` exige cette révision : si d'autres
/// écritures sont passées entre-temps, l'écrasement échoue au lieu
/// de détruire un état que l'opérateur n'a pas vu.
#[derive(Debug, Clone)]
pub struct ConflictReport {
    pub conflicts: Vec<ConflictInfo>,
    pub revision: u64,
}

/// Moteur de règles : encapsule un store de réservations et des
/// réglages, construits une fois au démarrage (aucun état global).
/// Toutes les mutations passent par `&mut self`, ce qui sérialise
/// les écritures d'un même processus.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    settings: ScheduleSettings,
}

impl<S: BookingStore> Engine<S> {
    pub fn new(store: S, settings: ScheduleSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Valide un créneau candidat sans rien écrire.
    pub fn validate(
        &self,
        date: NaiveDate,
        start: &str,
        end: &str,
    ) -> Result<ValidatedSlot, EngineError> {
        validate::validate(date, start, end, &self.settings)
    }

    /// Crée une réservation : validation → conflits → règles chan →
    /// écriture. État initial `Pending` si la validation manuelle est
    /// activée, `Confirmed` sinon.
    pub fn book(&mut self, req: CreateBookingRequest) -> Result<Booking, EngineError> {
        let slot = validate::validate(req.date, &req.start, &req.end, &self.settings)?;
        let day = self.store.list(Some(req.date));

        let found = conflicts::find_overlapping(&day, &slot.range, self.settings.time_zone);
        if !found.is_empty() {
            return Err(conflicts::conflict_error(&found));
        }

        if req.with_chan && !req.force_chan {
            let verdict = chan::is_chan_eligible(req.date, slot.start, &day, &self.settings);
            if let Some(reason) = verdict.reason {
                return Err(EngineError::ChanUnavailable(reason));
            }
        }

        let booking = self.build_booking(&req, &slot);
        self.store.add(booking.clone())?;
        #[cfg(feature = "logging")]
        tracing::info!(
            id = %booking.id.as_str(),
            date = %booking.date,
            status = ?booking.status,
            "booking created"
        );
        Ok(booking)
    }

    /// Expose les chevauchements pour qu'un humain décide avant
    /// d'invoquer `replace`.
    pub fn find_overlapping(
        &self,
        date: NaiveDate,
        start: &str,
        end: &str,
    ) -> Result<ConflictReport, EngineError> {
        let range = self.resolve_raw_range(date, start, end)?;
        let day = self.store.list(Some(date));
        let found = conflicts::find_overlapping(&day, &range, self.settings.time_zone);
        Ok(ConflictReport {
            conflicts: conflicts::infos(&found),
            revision: self.store.revision(),
        })
    }

    /// Écrasement admin : supprime puis insère en une seule écriture.
    /// Si l'un des ids a disparu, ou si le store a bougé depuis le
    /// rapport de conflits, rien n'est inséré.
    pub fn replace(&mut self, req: ReplaceBookingRequest) -> Result<Booking, EngineError> {
        if self.store.revision() != req.expected_revision {
            return Err(EngineError::StaleRevision);
        }
        let create = req.create;
        let slot = validate::validate(create.date, &create.start, &create.end, &self.settings)?;
        let day = self.store.list(Some(create.date));

        for id in &req.replace_ids {
            if !day.iter().any(|b| &b.id == id) {
                return Err(EngineError::UnknownBooking(id.as_str().to_string()));
            }
        }

        let mut kept: Vec<Booking> = day
            .into_iter()
            .filter(|b| !req.replace_ids.contains(&b.id))
            .collect();

        let found = conflicts::find_overlapping(&kept, &slot.range, self.settings.time_zone);
        if !found.is_empty() {
            return Err(conflicts::conflict_error(&found));
        }
        if create.with_chan && !create.force_chan {
            let verdict = chan::is_chan_eligible(create.date, slot.start, &kept, &self.settings);
            if let Some(reason) = verdict.reason {
                return Err(EngineError::ChanUnavailable(reason));
            }
        }

        let booking = self.build_booking(&create, &slot);
        kept.push(booking.clone());
        kept.sort_by_key(|b| b.start_time);
        self.store.replace_all_for_date(create.date, kept)?;
        #[cfg(feature = "logging")]
        tracing::info!(
            id = %booking.id.as_str(),
            replaced = req.replace_ids.len(),
            "bookings replaced"
        );
        Ok(booking)
    }

    pub fn remove(&mut self, id: &BookingId) -> Result<(), EngineError> {
        if self.store.remove(id)? {
            Ok(())
        } else {
            Err(EngineError::UnknownBooking(id.as_str().to_string()))
        }
    }

    pub fn clear_date(&mut self, date: NaiveDate) -> Result<usize, EngineError> {
        Ok(self.store.clear_date(date)?)
    }

    pub fn approve(&mut self, id: &BookingId) -> Result<Booking, EngineError> {
        lifecycle::approve(self, id)
    }

    pub fn reject(&mut self, id: &BookingId, reason: &str) -> Result<Booking, EngineError> {
        lifecycle::reject(self, id, reason)
    }

    pub fn cancel(&mut self, id: &BookingId) -> Result<Booking, EngineError> {
        lifecycle::cancel(self, id)
    }

    pub fn edit(&mut self, id: &BookingId, req: EditBookingRequest) -> Result<Booking, EngineError> {
        lifecycle::edit(self, id, req)
    }

    /// Plages encore libres du jour (complément des réservations).
    pub fn free_ranges(&self, date: NaiveDate) -> Vec<TimeRange> {
        freetime::free_ranges(date, &self.store.list(Some(date)), &self.settings)
    }

    /// Avis "trou serré" avant insertion ; jamais bloquant.
    pub fn check_gaps(&self, date: NaiveDate, start: &str, end: &str) -> Result<bool, EngineError> {
        let (start, end) = (parse_wall(start)?, parse_wall(end)?);
        Ok(freetime::check_gaps(
            date,
            start,
            end,
            &self.store.list(Some(date)),
            &self.settings,
        ))
    }

    /// Journée classifiée et fusionnée, prête pour le rendu.
    pub fn day_segments(&self, date: NaiveDate) -> Vec<DaySegment> {
        freetime::classify_day(date, &self.store.list(Some(date)), &self.settings)
    }

    pub fn chan_eligibility(
        &self,
        date: NaiveDate,
        start: &str,
    ) -> Result<ChanEligibility, EngineError> {
        let start = parse_wall(start)?;
        Ok(chan::is_chan_eligible(
            date,
            start,
            &self.store.list(Some(date)),
            &self.settings,
        ))
    }

    pub fn offered_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        self.settings.offered_dates(today)
    }

    fn build_booking(&self, req: &CreateBookingRequest, slot: &ValidatedSlot) -> Booking {
        let status = if self.settings.approval_required {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        };
        Booking {
            id: BookingId::random(),
            date: slot.date,
            start_time: slot.start,
            end_time: slot.end,
            duration_minutes: slot.duration_minutes,
            created_by: req.created_by,
            created_at: Utc::now(),
            note: req.note.clone(),
            with_chan: req.with_chan,
            status,
            status_reason: None,
        }
    }

    fn resolve_raw_range(
        &self,
        date: NaiveDate,
        start: &str,
        end: &str,
    ) -> Result<TimeRange, EngineError> {
        let (start, end) = (parse_wall(start)?, parse_wall(end)?);
        let resolve = |time| {
            timerange::resolve(date, time, self.settings.time_zone).ok_or(
                EngineError::NonexistentLocalTime {
                    date,
                    time,
                    tz: self.settings.time_zone.name(),
                },
            )
        };
        TimeRange::new(resolve(start)?, resolve(end)?).map_err(|_| EngineError::EndNotAfterStart)
    }
}

fn parse_wall(raw: &str) -> Result<WallTime, EngineError> {
    raw.parse()
        .map_err(|_| EngineError::BadTimeFormat(raw.to_string()))
}
