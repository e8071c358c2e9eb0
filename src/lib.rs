#![forbid(unsafe_code)]
//! Banya — moteur de règles de réservation pour un banya (un seul
//! établissement), stockage fichier, sans BD.
//!
//! - Noyau d'intervalles semi-ouverts résolus en fuseau nommé.
//! - Validation de créneaux, conflits, règles chan, temps libre.
//! - Cycle de vie soumis → confirmé/refusé → annulé.
//! - Tout le texte utilisateur, les menus et le rendu image restent
//!   chez les collaborateurs externes.

pub mod engine;
pub mod io;
pub mod model;
pub mod render;
pub mod storage;
pub mod timerange;

pub use engine::{
    check_gaps, classify_day, free_ranges, is_chan_eligible, merge_on_insert, CellStatus,
    ChanDenial, ChanEligibility, ChanPolicy, ConflictInfo, ConflictReport, CreateBookingRequest,
    DaySegment, EditBookingRequest, Engine, EngineError, HeatingGapPolicy, ReplaceBookingRequest,
    TimeOfDayPolicy, ValidatedSlot,
};
pub use model::{Booking, BookingId, BookingStatus, ChanPolicyKind, ScheduleSettings};
pub use render::{SegmentRenderer, TextGrid};
pub use storage::{BookingStore, JsonStore, MemoryStore};
pub use timerange::{TimeRange, WallTime};
