use crate::timerange::{self, TimeRange, WallTime};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort pour Booking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// États du cycle de vie d'une réservation.
///
/// Les fichiers écrits par la variante sans validation n'ont pas de
/// champ `status` : à la lecture ils valent `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Vrai pour un état dont aucune transition ne sort.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }

    /// Vrai si la réservation occupe encore potentiellement le créneau.
    pub fn is_live(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

fn default_status() -> BookingStatus {
    BookingStatus::Confirmed
}

/// Réservation du banya (une journée, heures murales locales).
///
/// Les noms de champs JSON sont le format persisté historique :
/// ne pas les renommer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(rename = "dateISO")]
    pub date: NaiveDate,
    pub start_time: WallTime,
    pub end_time: WallTime,
    pub duration_minutes: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub with_chan: bool,
    #[serde(default = "default_status")]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

impl Booking {
    /// Intervalle absolu de la réservation dans `tz`.
    pub fn range(&self, tz: Tz) -> Option<TimeRange> {
        timerange::resolve_range(self.date, self.start_time, self.end_time, tz)
    }
}

/// Politique d'éligibilité du chan (cuve chauffée partagée).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChanPolicyKind {
    /// Variante A : pas avant `chan_earliest_start`, exclusif par jour.
    TimeOfDay,
    /// Variante B : uniquement dans un trou libre en début de journée
    /// d'au moins `chan_min_gap_hours`.
    HeatingGap,
}

/// Réglages du planning, fournis par l'appelant (jamais globaux).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub time_zone: Tz,
    pub day_open: WallTime,
    pub day_close: WallTime,
    /// Granularité des heures proposées. Le validateur la borne
    /// à [5, 30] minutes quelle que soit la valeur configurée.
    pub slot_step_minutes: u16,
    pub allowed_durations_hours: Vec<u8>,
    /// Horizon de réservation en jours.
    pub schedule_days: u16,
    pub approval_required: bool,
    /// Trou voisin en dessous duquel on avertit (avis, pas refus).
    pub tight_gap_minutes: i64,
    pub cleaning_buffer_minutes: i64,
    /// Un trou qui se termine à cette heure ou après échappe à
    /// l'avertissement : plus rien à caser derrière.
    pub useful_day_end: WallTime,
    pub chan_policy: ChanPolicyKind,
    pub chan_earliest_start: WallTime,
    pub chan_min_gap_hours: u8,
}

/// Durée plancher quand `allowed_durations_hours` est vide.
const FALLBACK_DURATION_HOURS: i64 = 2;

fn wall(hour: u8, minute: u8) -> WallTime {
    WallTime::new(hour, minute).unwrap_or(WallTime::DAY_END)
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::Europe::Moscow,
            day_open: wall(9, 0),
            day_close: wall(23, 0),
            slot_step_minutes: 30,
            allowed_durations_hours: vec![2, 3, 4, 5, 6],
            schedule_days: 14,
            approval_required: false,
            tight_gap_minutes: 120,
            cleaning_buffer_minutes: 60,
            useful_day_end: wall(21, 0),
            chan_policy: ChanPolicyKind::TimeOfDay,
            chan_earliest_start: wall(13, 0),
            chan_min_gap_hours: 5,
        }
    }
}

impl ScheduleSettings {
    /// Durée minimale d'une réservation, en minutes.
    pub fn min_duration_minutes(&self) -> i64 {
        self.allowed_durations_hours
            .iter()
            .copied()
            .min()
            .map(|h| i64::from(h) * 60)
            .unwrap_or(FALLBACK_DURATION_HOURS * 60)
    }

    /// Dates proposées à la réservation à partir de `today` incluse.
    pub fn offered_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        (0..i64::from(self.schedule_days))
            .filter_map(|offset| today.checked_add_signed(chrono::Duration::days(offset)))
            .collect()
    }
}
