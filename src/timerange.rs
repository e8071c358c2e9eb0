use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Nombre de minutes dans une journée ("24:00" sentinelle incluse).
pub const DAY_END_MINUTES: u16 = 24 * 60;

/// Heure murale à la minute près, `00:00` ..= `24:00`.
///
/// `24:00` est une sentinelle valide : minuit du jour suivant.
/// Le parsing est strict (`HH:mm`, zéro-paddé) ; tout le reste est refusé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime(u16);

impl WallTime {
    /// Minuit du jour suivant ("24:00").
    pub const DAY_END: WallTime = WallTime(DAY_END_MINUTES);

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        Self::from_minutes(u16::from(hour) * 60 + u16::from(minute))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= DAY_END_MINUTES).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Vraie pour la sentinelle "24:00".
    pub fn is_day_end(self) -> bool {
        self.0 == DAY_END_MINUTES
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for WallTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let strict = bytes.len() == 5
            && bytes[2] == b':'
            && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
        if !strict {
            return Err(format!("expected strict HH:mm, got {s:?}"));
        }
        let hour: u16 = s[..2].parse().map_err(|_| format!("bad hour in {s:?}"))?;
        let minute: u16 = s[3..].parse().map_err(|_| format!("bad minute in {s:?}"))?;
        if minute >= 60 || (hour > 23 && !(hour == 24 && minute == 0)) {
            return Err(format!("out-of-range wall time {s:?}"));
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Résout `(date, heure murale)` en instant absolu dans `tz`.
///
/// "24:00" bascule sur le jour suivant. Une heure locale ambiguë
/// (retour à l'heure d'hiver) prend la première occurrence ; une heure
/// inexistante (passage à l'heure d'été) renvoie `None`.
pub fn resolve(date: NaiveDate, wall: WallTime, tz: Tz) -> Option<DateTime<Tz>> {
    let (date, minutes) = if wall.is_day_end() {
        (date.succ_opt()?, 0)
    } else {
        (date, u32::from(wall.minutes()))
    };
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;
    tz.from_local_datetime(&NaiveDateTime::new(date, time)).earliest()
}

/// Intervalle semi-ouvert `[start, end)` sur instants absolus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeRange {
    /// Construit un intervalle en validant `end > start`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self { start, end })
    }

    /// Chevauchement strict : des intervalles qui se touchent ne
    /// se chevauchent pas.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Contact ou chevauchement. Réservé au chemin merge-on-insert,
    /// où des plages adjacentes doivent fusionner.
    pub fn touches_or_overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, inner: &TimeRange) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    pub fn contains_instant(&self, at: DateTime<Tz>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Résout un couple d'heures murales en intervalle absolu sur `date`.
pub fn resolve_range(
    date: NaiveDate,
    start: WallTime,
    end: WallTime,
    tz: Tz,
) -> Option<TimeRange> {
    let start = resolve(date, start, tz)?;
    let end = resolve(date, end, tz)?;
    TimeRange::new(start, end).ok()
}
