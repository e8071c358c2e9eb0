use crate::model::{BookingId, BookingStatus};
use crate::timerange::WallTime;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Réservation en conflit, telle que remontée à l'opérateur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    pub id: BookingId,
    pub date: NaiveDate,
    pub start_time: WallTime,
    pub end_time: WallTime,
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{}",
            self.id.as_str(),
            self.date,
            self.start_time,
            self.end_time
        )
    }
}

/// Motif précis d'inéligibilité du chan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDenial {
    TooEarly { earliest: WallTime },
    AlreadyUsedToday,
    InsufficientHeatingGap { required_hours: u8 },
}

impl fmt::Display for ChanDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChanDenial::TooEarly { earliest } => {
                write!(f, "too early: chan starts at {earliest} at the soonest")
            }
            ChanDenial::AlreadyUsedToday => write!(f, "already used today"),
            ChanDenial::InsufficientHeatingGap { required_hours } => {
                write!(f, "insufficient heating gap: needs {required_hours}h at the start of the day")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed time {0:?}: expected strict HH:mm")]
    BadTimeFormat(String),
    #[error("time {time} is not aligned to the {step}-minute step")]
    StepMisaligned { time: WallTime, step: u16 },
    #[error("end must be strictly after start")]
    EndNotAfterStart,
    #[error("duration {actual} min is below the {min} min minimum")]
    DurationTooShort { actual: i64, min: i64 },
    #[error("booking must stay within opening hours {open}-{close}")]
    OutsideOpenHours { open: WallTime, close: WallTime },
    #[error("local time {time} does not exist on {date} in {tz}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: WallTime,
        tz: &'static str,
    },
    #[error("overlaps {} existing booking(s)", .conflicts.len())]
    Conflict { conflicts: Vec<ConflictInfo> },
    #[error("chan unavailable: {0}")]
    ChanUnavailable(ChanDenial),
    #[error("unknown booking id: {0}")]
    UnknownBooking(String),
    #[error("cannot {action} a booking in state {from:?}")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },
    #[error("bookings changed since the conflict report was taken")]
    StaleRevision,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Demande de création, champs explicites (pas de sac d'options).
#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    /// Heures murales brutes (`HH:mm`), validées par le moteur.
    pub start: String,
    pub end: String,
    pub created_by: i64,
    pub with_chan: bool,
    /// Passe outre les règles chan (jamais la validité du créneau).
    pub force_chan: bool,
    pub note: Option<String>,
}

/// Écrasement explicite : supprime `replace_ids` puis insère.
#[derive(Debug, Clone)]
pub struct ReplaceBookingRequest {
    /// Révision du store au moment où le conflit a été montré
    /// à l'opérateur (voir [`super::ConflictReport`]).
    pub expected_revision: u64,
    pub replace_ids: Vec<BookingId>,
    pub create: CreateBookingRequest,
}

/// Nouveau créneau pour `edit` ; le reste de la fiche est repris.
#[derive(Debug, Clone)]
pub struct EditBookingRequest {
    pub date: NaiveDate,
    pub start: String,
    pub end: String,
}
