use crate::engine::{CellStatus, DaySegment};
use chrono::NaiveDate;

/// Permet de customiser le rendu d'une journée classifiée (texte,
/// image...). Le moteur ne doit rien de plus aux rendus que la
/// séquence de segments.
pub trait SegmentRenderer {
    fn render(&self, date: NaiveDate, segments: &[DaySegment]) -> String;
}

/// Grille texte simple, une ligne par segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextGrid;

impl SegmentRenderer for TextGrid {
    fn render(&self, date: NaiveDate, segments: &[DaySegment]) -> String {
        let mut out = format!("{date}\n");
        for seg in segments {
            let label = match seg.status {
                CellStatus::Booked => "réservé",
                CellStatus::CleaningBuffer => "ménage",
                CellStatus::TooTight => "trop court",
                CellStatus::Available => "libre",
            };
            let chan = if seg.chan_eligible { " [chan]" } else { "" };
            out.push_str(&format!("{}-{} {}{}\n", seg.start, seg.end, label, chan));
        }
        out
    }
}
