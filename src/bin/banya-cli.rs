#![forbid(unsafe_code)]
use anyhow::Result;
use banya::{
    io,
    model::{BookingId, ScheduleSettings},
    BookingStore, CreateBookingRequest, EditBookingRequest, Engine, JsonStore,
    ReplaceBookingRequest, SegmentRenderer, TextGrid,
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de réservation du banya (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des réservations
    #[arg(long, global = true, default_value = "bookings.json")]
    data: String,

    /// Réglages JSON (défauts intégrés sinon)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Réserver un créneau
    Book {
        /// yyyy-MM-dd
        #[arg(long)]
        date: NaiveDate,
        /// HH:mm
        #[arg(long)]
        start: String,
        /// HH:mm ("24:00" accepté)
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = 0)]
        by: i64,
        /// Rattacher le chan
        #[arg(long)]
        chan: bool,
        /// Outrepasser les règles chan (jamais la validité du créneau)
        #[arg(long)]
        force_chan: bool,
        #[arg(long)]
        note: Option<String>,
    },

    /// Plages libres d'une journée
    Free {
        #[arg(long)]
        date: NaiveDate,
    },

    /// Grille classifiée d'une journée (texte ou JSON)
    Grid {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },

    /// Avis "trou serré" avant insertion
    Check {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Lister les réservations en conflit avec un créneau
    Conflicts {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Écraser des réservations en conflit (suppression + insertion)
    Replace {
        /// ids à supprimer, séparés par des virgules
        #[arg(long)]
        ids: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = 0)]
        by: i64,
        #[arg(long)]
        chan: bool,
        #[arg(long)]
        force_chan: bool,
        #[arg(long)]
        note: Option<String>,
    },

    /// Éligibilité du chan pour une heure de début
    Chan {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
    },

    /// Confirmer une demande en attente
    Approve {
        #[arg(long)]
        id: String,
    },

    /// Refuser une demande en attente (motif obligatoire)
    Reject {
        #[arg(long)]
        id: String,
        #[arg(long)]
        reason: String,
    },

    /// Annuler une réservation
    Cancel {
        #[arg(long)]
        id: String,
    },

    /// Déplacer une demande en attente (annule + recrée)
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Supprimer une réservation
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Vider une journée
    ClearDay {
        #[arg(long)]
        date: NaiveDate,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Importer des réservations depuis un CSV
    Import {
        #[arg(long)]
        csv: String,
    },

    /// Dates encore proposées à la réservation
    Dates,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let settings = match &cli.config {
        Some(path) => io::load_settings(path)?,
        None => ScheduleSettings::default(),
    };
    let store = JsonStore::open(&cli.data)?;
    let mut engine = Engine::new(store, settings);

    let code = match cli.cmd {
        Commands::Book {
            date,
            start,
            end,
            by,
            chan,
            force_chan,
            note,
        } => {
            let booking = engine.book(CreateBookingRequest {
                date,
                start,
                end,
                created_by: by,
                with_chan: chan,
                force_chan,
                note,
            })?;
            println!(
                "{} | {} {}-{} | {:?}",
                booking.id.as_str(),
                booking.date,
                booking.start_time,
                booking.end_time,
                booking.status
            );
            0
        }
        Commands::Free { date } => {
            for range in engine.free_ranges(date) {
                println!("{} → {}", range.start.to_rfc3339(), range.end.to_rfc3339());
            }
            0
        }
        Commands::Grid { date, json } => {
            let segments = engine.day_segments(date);
            if json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
            } else {
                print!("{}", TextGrid.render(date, &segments));
            }
            0
        }
        Commands::Check { date, start, end } => {
            if engine.check_gaps(date, &start, &end)? {
                eprintln!("Warning: tight gap left around {start}-{end}");
                2
            } else {
                println!("OK: no tight gap");
                0
            }
        }
        Commands::Conflicts { date, start, end } => {
            let report = engine.find_overlapping(date, &start, &end)?;
            if report.conflicts.is_empty() {
                println!("OK: no conflicts (revision {})", report.revision);
                0
            } else {
                eprintln!(
                    "Found {} conflict(s) at revision {}",
                    report.conflicts.len(),
                    report.revision
                );
                for c in &report.conflicts {
                    println!("{c}");
                }
                2
            }
        }
        Commands::Replace {
            ids,
            date,
            start,
            end,
            by,
            chan,
            force_chan,
            note,
        } => {
            let replace_ids: Vec<BookingId> = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(BookingId::new)
                .collect();
            let expected_revision = engine.store().revision();
            let booking = engine.replace(ReplaceBookingRequest {
                expected_revision,
                replace_ids,
                create: CreateBookingRequest {
                    date,
                    start,
                    end,
                    created_by: by,
                    with_chan: chan,
                    force_chan,
                    note,
                },
            })?;
            println!("replaced → {}", booking.id.as_str());
            0
        }
        Commands::Chan { date, start } => {
            let verdict = engine.chan_eligibility(date, &start)?;
            match verdict.reason {
                None => {
                    println!("chan OK for {date} {start}");
                    0
                }
                Some(reason) => {
                    eprintln!("chan unavailable: {reason}");
                    2
                }
            }
        }
        Commands::Approve { id } => {
            let booking = engine.approve(&BookingId::new(id))?;
            println!("confirmed {}", booking.id.as_str());
            0
        }
        Commands::Reject { id, reason } => {
            let booking = engine.reject(&BookingId::new(id), &reason)?;
            println!("rejected {}", booking.id.as_str());
            0
        }
        Commands::Cancel { id } => {
            let booking = engine.cancel(&BookingId::new(id))?;
            println!("cancelled {}", booking.id.as_str());
            0
        }
        Commands::Edit {
            id,
            date,
            start,
            end,
        } => {
            let booking = engine.edit(&BookingId::new(id), EditBookingRequest { date, start, end })?;
            println!("moved → {}", booking.id.as_str());
            0
        }
        Commands::Remove { id } => {
            engine.remove(&BookingId::new(id))?;
            println!("removed");
            0
        }
        Commands::ClearDay { date } => {
            let cleared = engine.clear_date(date)?;
            println!("cleared {cleared} booking(s) on {date}");
            0
        }
        Commands::List {
            date,
            out_json,
            out_csv,
        } => {
            let bookings = engine.store().list(date);
            if let Some(path) = out_json {
                io::export_bookings_json(path, &bookings)?;
            }
            if let Some(path) = out_csv {
                io::export_bookings_csv(path, &bookings)?;
            }
            // impression compacte
            for b in &bookings {
                println!(
                    "{} | {} {}-{} | {:?}{}",
                    b.id.as_str(),
                    b.date,
                    b.start_time,
                    b.end_time,
                    b.status,
                    if b.with_chan { " +chan" } else { "" }
                );
            }
            0
        }
        Commands::Import { csv } => {
            let bookings = io::import_bookings_csv(csv)?;
            let count = bookings.len();
            for b in bookings {
                engine.store_mut().add(b)?;
            }
            println!("imported {count} booking(s)");
            0
        }
        Commands::Dates => {
            for date in engine.offered_dates(Utc::now().date_naive()) {
                println!("{date}");
            }
            0
        }
    };

    std::process::exit(code);
}
