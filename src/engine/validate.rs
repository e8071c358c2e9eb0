use super::types::EngineError;
use crate::model::ScheduleSettings;
use crate::timerange::{self, TimeRange, WallTime};
use chrono::NaiveDate;

/// Bornes du pas de grille. Le pas configuré est ramené dans cet
/// intervalle avant le contrôle d'alignement : un réglage fantaisiste
/// (0, 1440...) ne doit ni tout refuser ni tout laisser passer.
const STEP_MIN: u16 = 5;
const STEP_MAX: u16 = 30;

/// Pas de grille effectif, borné. Partagé avec le classifieur pour
/// que cellules et contrôles d'alignement tombent sur la même grille.
pub(super) fn clamped_step(settings: &ScheduleSettings) -> u16 {
    settings.slot_step_minutes.clamp(STEP_MIN, STEP_MAX)
}

/// Créneau candidat une fois les cinq contrôles passés.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSlot {
    pub date: NaiveDate,
    pub start: WallTime,
    pub end: WallTime,
    pub range: TimeRange,
    pub duration_minutes: i64,
}

/// Valide un créneau candidat. Contrôles dans l'ordre, premier échec
/// gagnant ; purement fonctionnel, aucune écriture.
pub(super) fn validate(
    date: NaiveDate,
    start_raw: &str,
    end_raw: &str,
    settings: &ScheduleSettings,
) -> Result<ValidatedSlot, EngineError> {
    // 1. format strict HH:mm
    let start: WallTime = start_raw
        .parse()
        .map_err(|_| EngineError::BadTimeFormat(start_raw.to_string()))?;
    let end: WallTime = end_raw
        .parse()
        .map_err(|_| EngineError::BadTimeFormat(end_raw.to_string()))?;

    // 2. alignement sur le pas (borné, voir STEP_MIN/STEP_MAX)
    let step = clamped_step(settings);
    for time in [start, end] {
        if time.minutes() % step != 0 {
            return Err(EngineError::StepMisaligned { time, step });
        }
    }

    // 3. end > start, sur instants résolus (sentinelle 24:00 comprise)
    let start_instant = resolve_or_err(date, start, settings)?;
    let end_instant = resolve_or_err(date, end, settings)?;
    let range = TimeRange::new(start_instant, end_instant)
        .map_err(|_| EngineError::EndNotAfterStart)?;

    // 4. durée minimale
    let duration_minutes = range.duration_minutes();
    let min = settings.min_duration_minutes();
    if duration_minutes < min {
        return Err(EngineError::DurationTooShort {
            actual: duration_minutes,
            min,
        });
    }

    // 5. bornes d'ouverture
    if start < settings.day_open || end > settings.day_close {
        return Err(EngineError::OutsideOpenHours {
            open: settings.day_open,
            close: settings.day_close,
        });
    }

    Ok(ValidatedSlot {
        date,
        start,
        end,
        range,
        duration_minutes,
    })
}

fn resolve_or_err(
    date: NaiveDate,
    time: WallTime,
    settings: &ScheduleSettings,
) -> Result<chrono::DateTime<chrono_tz::Tz>, EngineError> {
    timerange::resolve(date, time, settings.time_zone).ok_or(EngineError::NonexistentLocalTime {
        date,
        time,
        tz: settings.time_zone.name(),
    })
}
