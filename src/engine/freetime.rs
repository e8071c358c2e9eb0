use super::{chan, conflicts, validate};
use crate::model::{Booking, ScheduleSettings};
use crate::timerange::{self, TimeRange, WallTime};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Statut d'une cellule de la journée, côté rendu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellStatus {
    Booked,
    /// Fenêtre de ménage juste après une réservation.
    CleaningBuffer,
    /// Libre mais trop court pour caser la durée minimale.
    TooTight,
    Available,
}

/// Segment contigu de cellules de même statut, prêt pour le rendu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySegment {
    pub date: NaiveDate,
    #[serde(rename = "cellStart")]
    pub start: WallTime,
    #[serde(rename = "cellEnd")]
    pub end: WallTime,
    pub status: CellStatus,
    #[serde(rename = "auxiliaryEligible")]
    pub chan_eligible: bool,
}

/// Plages confirmées du jour, résolues et triées par début.
fn booked_ranges(date: NaiveDate, bookings: &[Booking], settings: &ScheduleSettings) -> Vec<TimeRange> {
    let mut ranges: Vec<TimeRange> = conflicts::blocking(bookings)
        .filter(|b| b.date == date)
        .filter_map(|b| b.range(settings.time_zone))
        .collect();
    ranges.sort_by_key(|r| r.start);
    ranges
}

/// Complément des plages réservées dans `[day_open, day_close)`.
/// Balayage à curseur en une passe, tri compris.
pub fn free_ranges(
    date: NaiveDate,
    bookings: &[Booking],
    settings: &ScheduleSettings,
) -> Vec<TimeRange> {
    let Some(day) =
        timerange::resolve_range(date, settings.day_open, settings.day_close, settings.time_zone)
    else {
        return Vec::new();
    };

    let mut free = Vec::new();
    let mut cursor = day.start;
    for booked in booked_ranges(date, bookings, settings) {
        if booked.start > cursor {
            if let Ok(range) = TimeRange::new(cursor, booked.start.min(day.end)) {
                free.push(range);
            }
        }
        cursor = cursor.max(booked.end);
    }
    if cursor < day.end {
        if let Ok(range) = TimeRange::new(cursor, day.end) {
            free.push(range);
        }
    }
    free
}

/// Avertit (sans refuser) si l'insertion du candidat laisserait un
/// trou voisin positif mais plus court que `tight_gap_minutes`.
/// Un trou qui se termine à `useful_day_end` ou après est exempté.
pub fn check_gaps(
    date: NaiveDate,
    cand_start: WallTime,
    cand_end: WallTime,
    bookings: &[Booking],
    settings: &ScheduleSettings,
) -> bool {
    let tz = settings.time_zone;
    let (Some(start), Some(end), Some(day)) = (
        timerange::resolve(date, cand_start, tz),
        timerange::resolve(date, cand_end, tz),
        timerange::resolve_range(date, settings.day_open, settings.day_close, tz),
    ) else {
        return false;
    };
    let cutoff = timerange::resolve(date, settings.useful_day_end, tz).unwrap_or(day.end);

    let booked = booked_ranges(date, bookings, settings);
    let prev_end = booked
        .iter()
        .map(|r| r.end)
        .filter(|e| *e <= start)
        .max()
        .unwrap_or(day.start);
    let next_start = booked
        .iter()
        .map(|r| r.start)
        .filter(|s| *s >= end)
        .min()
        .unwrap_or(day.end);

    let tight = |gap_minutes: i64, gap_end: chrono::DateTime<chrono_tz::Tz>| {
        gap_minutes > 0 && gap_minutes < settings.tight_gap_minutes && gap_end < cutoff
    };
    tight((start - prev_end).num_minutes(), start)
        || tight((next_start - end).num_minutes(), next_start)
}

/// Classifie la journée cellule par cellule au pas de grille, puis
/// fusionne les cellules adjacentes identiques (statut + éligibilité
/// chan) en segments : simple RLE, rien de spécifique au rendu image.
pub fn classify_day(
    date: NaiveDate,
    bookings: &[Booking],
    settings: &ScheduleSettings,
) -> Vec<DaySegment> {
    let tz = settings.time_zone;
    let Some(day) =
        timerange::resolve_range(date, settings.day_open, settings.day_close, tz)
    else {
        return Vec::new();
    };
    let step = i64::from(validate::clamped_step(settings));
    let min_duration = settings.min_duration_minutes();
    let buffer = Duration::minutes(settings.cleaning_buffer_minutes);
    let booked = booked_ranges(date, bookings, settings);

    let mut segments: Vec<DaySegment> = Vec::new();
    let open = i64::from(settings.day_open.minutes());
    let close = i64::from(settings.day_close.minutes());

    let mut cell_start_min = open;
    while cell_start_min < close {
        let cell_end_min = (cell_start_min + step).min(close);
        let (Some(start_wall), Some(end_wall)) = (
            WallTime::from_minutes(cell_start_min as u16),
            WallTime::from_minutes(cell_end_min as u16),
        ) else {
            break;
        };
        let Some(cell) = timerange::resolve_range(date, start_wall, end_wall, tz) else {
            cell_start_min = cell_end_min;
            continue;
        };

        let status = if booked.iter().any(|r| r.overlaps(&cell)) {
            CellStatus::Booked
        } else if booked
            .iter()
            .any(|r| r.end <= cell.start && cell.start < r.end + buffer)
        {
            CellStatus::CleaningBuffer
        } else {
            let next_commitment = booked
                .iter()
                .map(|r| r.start)
                .filter(|s| *s >= cell.start)
                .min()
                .unwrap_or(day.end);
            let room = (next_commitment - cell.start).num_minutes();
            if room < min_duration {
                CellStatus::TooTight
            } else {
                CellStatus::Available
            }
        };

        let chan_eligible = matches!(status, CellStatus::TooTight | CellStatus::Available)
            && chan::is_chan_eligible(date, start_wall, bookings, settings).eligible;

        // fusion RLE avec le segment précédent
        match segments.last_mut() {
            Some(last)
                if last.status == status
                    && last.chan_eligible == chan_eligible
                    && last.end == start_wall =>
            {
                last.end = end_wall;
            }
            _ => segments.push(DaySegment {
                date,
                start: start_wall,
                end: end_wall,
                status,
                chan_eligible,
            }),
        }

        cell_start_min = cell_end_min;
    }

    segments
}
