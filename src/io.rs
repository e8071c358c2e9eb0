use crate::model::{Booking, BookingId, BookingStatus, ScheduleSettings};
use crate::timerange::WallTime;
use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de réservations depuis CSV :
/// header `date,start,end,created_by,with_chan[,note]`.
/// Les fiches importées sont confirmées d'office.
pub fn import_bookings_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Booking>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = rec.get(0).context("missing date")?.trim();
        let start = rec.get(1).context("missing start")?.trim();
        let end = rec.get(2).context("missing end")?.trim();
        let created_by = rec.get(3).context("missing created_by")?.trim();
        let with_chan = rec.get(4).context("missing with_chan")?.trim();

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date}"))?;
        let start: WallTime = start
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| "start HH:mm")?;
        let end: WallTime = end
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| "end HH:mm")?;
        if end <= start {
            bail!("end must be after start ({start}-{end})");
        }
        let note = rec
            .get(5)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        out.push(Booking {
            id: BookingId::random(),
            date,
            start_time: start,
            end_time: end,
            duration_minutes: i64::from(end.minutes()) - i64::from(start.minutes()),
            created_by: created_by
                .parse()
                .with_context(|| format!("invalid created_by: {created_by}"))?,
            created_at: Utc::now(),
            note,
            with_chan: parse_bool(with_chan)
                .with_context(|| format!("invalid with_chan value on {date}"))?,
            status: BookingStatus::Confirmed,
            status_reason: None,
        });
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn status_label(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "PENDING",
        BookingStatus::Confirmed => "CONFIRMED",
        BookingStatus::Rejected => "REJECTED",
        BookingStatus::Cancelled => "CANCELLED",
    }
}

/// Export JSON des réservations (jolie mise en forme, format persisté).
pub fn export_bookings_json<P: AsRef<Path>>(path: P, bookings: &[Booking]) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(bookings)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV : header `id,date,start,end,duration_minutes,created_by,with_chan,status,note`.
pub fn export_bookings_csv<P: AsRef<Path>>(path: P, bookings: &[Booking]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "date",
        "start",
        "end",
        "duration_minutes",
        "created_by",
        "with_chan",
        "status",
        "note",
    ])?;
    for b in bookings {
        let date = b.date.to_string();
        let start = b.start_time.to_string();
        let end = b.end_time.to_string();
        let duration = b.duration_minutes.to_string();
        let created_by = b.created_by.to_string();
        w.write_record([
            b.id.as_str(),
            date.as_str(),
            start.as_str(),
            end.as_str(),
            duration.as_str(),
            created_by.as_str(),
            if b.with_chan { "true" } else { "false" },
            status_label(b.status),
            b.note.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Charge des réglages depuis un fichier JSON (champs manquants aux
/// valeurs par défaut).
pub fn load_settings<P: AsRef<Path>>(path: P) -> anyhow::Result<ScheduleSettings> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let settings: ScheduleSettings = serde_json::from_slice(&data)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    if settings.day_close <= settings.day_open {
        bail!("day_close must be after day_open");
    }
    Ok(settings)
}
