use crate::model::{Booking, BookingId};
use anyhow::Context;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Collaborateur de stockage du moteur. `revision` est incrémentée à
/// chaque mutation ; elle sous-tend le contrôle optimiste du flux
/// consulter-puis-écraser (voir [`crate::engine::ConflictReport`]).
pub trait BookingStore {
    /// Toutes les réservations, éventuellement filtrées sur un jour.
    fn list(&self, date: Option<NaiveDate>) -> Vec<Booking>;
    fn add(&mut self, booking: Booking) -> anyhow::Result<()>;
    fn remove(&mut self, id: &BookingId) -> anyhow::Result<bool>;
    /// Remplace d'un bloc toutes les réservations d'un jour.
    fn replace_all_for_date(&mut self, date: NaiveDate, bookings: Vec<Booking>)
        -> anyhow::Result<()>;
    fn clear_date(&mut self, date: NaiveDate) -> anyhow::Result<usize>;
    fn revision(&self) -> u64;
}

fn filtered(bookings: &[Booking], date: Option<NaiveDate>) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| date.map_or(true, |d| b.date == d))
        .cloned()
        .collect()
}

/// Store en mémoire, pour les tests et l'embarqué.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bookings: Vec<Booking>,
    revision: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            revision: 0,
        }
    }
}

impl BookingStore for MemoryStore {
    fn list(&self, date: Option<NaiveDate>) -> Vec<Booking> {
        filtered(&self.bookings, date)
    }

    fn add(&mut self, booking: Booking) -> anyhow::Result<()> {
        self.bookings.push(booking);
        self.revision += 1;
        Ok(())
    }

    fn remove(&mut self, id: &BookingId) -> anyhow::Result<bool> {
        let before = self.bookings.len();
        self.bookings.retain(|b| &b.id != id);
        let removed = self.bookings.len() != before;
        if removed {
            self.revision += 1;
        }
        Ok(removed)
    }

    fn replace_all_for_date(
        &mut self,
        date: NaiveDate,
        bookings: Vec<Booking>,
    ) -> anyhow::Result<()> {
        self.bookings.retain(|b| b.date != date);
        self.bookings.extend(bookings);
        self.revision += 1;
        Ok(())
    }

    fn clear_date(&mut self, date: NaiveDate) -> anyhow::Result<usize> {
        let before = self.bookings.len();
        self.bookings.retain(|b| b.date != date);
        let cleared = before - self.bookings.len();
        if cleared > 0 {
            self.revision += 1;
        }
        Ok(cleared)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Store fichier : un tableau JSON relu en entier à l'ouverture et
/// réécrit en bloc, de manière atomique, à chaque mutation.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    bookings: Vec<Booking>,
    revision: u64,
}

impl JsonStore {
    /// Ouvre le fichier s'il existe, sinon démarre vide.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bookings = if path.exists() {
            let data =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Vec::new()
        };
        Ok(Self {
            path,
            bookings,
            revision: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, bookings: &[Booking]) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(bookings)?;
        let mut tmp = NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }

    /// Écrit `next` sur disque, puis seulement là remplace l'état en
    /// mémoire et incrémente la révision. Un échec d'écriture laisse
    /// le store exactement comme avant.
    fn commit(&mut self, next: Vec<Booking>) -> anyhow::Result<()> {
        self.persist(&next)?;
        self.bookings = next;
        self.revision += 1;
        Ok(())
    }
}

impl BookingStore for JsonStore {
    fn list(&self, date: Option<NaiveDate>) -> Vec<Booking> {
        filtered(&self.bookings, date)
    }

    fn add(&mut self, booking: Booking) -> anyhow::Result<()> {
        let mut next = self.bookings.clone();
        next.push(booking);
        self.commit(next)
    }

    fn remove(&mut self, id: &BookingId) -> anyhow::Result<bool> {
        let next: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| &b.id != id)
            .cloned()
            .collect();
        if next.len() == self.bookings.len() {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    fn replace_all_for_date(
        &mut self,
        date: NaiveDate,
        bookings: Vec<Booking>,
    ) -> anyhow::Result<()> {
        let mut next: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.date != date)
            .cloned()
            .collect();
        next.extend(bookings);
        self.commit(next)
    }

    fn clear_date(&mut self, date: NaiveDate) -> anyhow::Result<usize> {
        let next: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.date != date)
            .cloned()
            .collect();
        let cleared = self.bookings.len() - next.len();
        if cleared > 0 {
            self.commit(next)?;
        }
        Ok(cleared)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
