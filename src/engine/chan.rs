use super::freetime;
use super::types::ChanDenial;
use crate::model::{Booking, ChanPolicyKind, ScheduleSettings};
use crate::timerange::{self, WallTime};
use chrono::NaiveDate;

/// Règle d'attribution du chan, sélectionnée par
/// [`ScheduleSettings::chan_policy`].
pub trait ChanPolicy {
    fn check(
        &self,
        date: NaiveDate,
        start: WallTime,
        bookings: &[Booking],
        settings: &ScheduleSettings,
    ) -> Result<(), ChanDenial>;
}

/// Variante A : jamais avant `chan_earliest_start`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeOfDayPolicy;

impl ChanPolicy for TimeOfDayPolicy {
    fn check(
        &self,
        _date: NaiveDate,
        start: WallTime,
        _bookings: &[Booking],
        settings: &ScheduleSettings,
    ) -> Result<(), ChanDenial> {
        if start < settings.chan_earliest_start {
            return Err(ChanDenial::TooEarly {
                earliest: settings.chan_earliest_start,
            });
        }
        Ok(())
    }
}

/// Variante B : le chan demande un trou de chauffe d'au moins
/// `chan_min_gap_hours`, et seulement le trou qui ouvre la journée.
/// Un trou de même longueur en milieu ou fin de journée ne donne
/// rien : l'asymétrie est voulue par l'auteur de la règle.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeatingGapPolicy;

impl ChanPolicy for HeatingGapPolicy {
    fn check(
        &self,
        date: NaiveDate,
        start: WallTime,
        bookings: &[Booking],
        settings: &ScheduleSettings,
    ) -> Result<(), ChanDenial> {
        let denial = ChanDenial::InsufficientHeatingGap {
            required_hours: settings.chan_min_gap_hours,
        };
        let Some(start_instant) = timerange::resolve(date, start, settings.time_zone) else {
            return Err(denial);
        };
        let Some(day_open) = timerange::resolve(date, settings.day_open, settings.time_zone)
        else {
            return Err(denial);
        };
        let gaps = freetime::free_ranges(date, bookings, settings);
        let Some(gap) = gaps.iter().find(|g| g.contains_instant(start_instant)) else {
            return Err(denial);
        };
        let long_enough =
            gap.duration_minutes() >= i64::from(settings.chan_min_gap_hours) * 60;
        if gap.start != day_open || !long_enough {
            return Err(denial);
        }
        Ok(())
    }
}

pub(super) fn policy_for(kind: ChanPolicyKind) -> &'static dyn ChanPolicy {
    match kind {
        ChanPolicyKind::TimeOfDay => &TimeOfDayPolicy,
        ChanPolicyKind::HeatingGap => &HeatingGapPolicy,
    }
}

/// Verdict d'éligibilité, motif inclus pour l'UI corrective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChanEligibility {
    pub eligible: bool,
    pub reason: Option<ChanDenial>,
}

/// Teste si le chan peut être rattaché à une réservation démarrant à
/// `start` le `date`. L'exclusivité par jour vaut pour les deux
/// politiques : une demande en attente retient déjà la cuve.
pub fn is_chan_eligible(
    date: NaiveDate,
    start: WallTime,
    bookings: &[Booking],
    settings: &ScheduleSettings,
) -> ChanEligibility {
    let taken = bookings
        .iter()
        .any(|b| b.date == date && b.with_chan && b.status.is_live());
    let verdict = if taken {
        Err(ChanDenial::AlreadyUsedToday)
    } else {
        policy_for(settings.chan_policy).check(date, start, bookings, settings)
    };
    match verdict {
        Ok(()) => ChanEligibility {
            eligible: true,
            reason: None,
        },
        Err(denial) => ChanEligibility {
            eligible: false,
            reason: Some(denial),
        },
    }
}
