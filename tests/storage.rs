#![forbid(unsafe_code)]
use banya::{
    Booking, BookingStatus, BookingStore, CreateBookingRequest, Engine, JsonStore,
    ScheduleSettings,
};
use chrono::NaiveDate;
use std::fs;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

#[test]
fn json_store_round_trips_with_historic_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookings.json");

    let store = JsonStore::open(&path).unwrap();
    let mut e = Engine::new(store, ScheduleSettings::default());
    let booked = e
        .book(CreateBookingRequest {
            date: day(),
            start: "10:00".to_string(),
            end: "12:00".to_string(),
            created_by: 42,
            with_chan: true,
            force_chan: true,
            note: Some("anniversaire".to_string()),
        })
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    for field in [
        "\"id\"",
        "\"dateISO\"",
        "\"startTime\"",
        "\"endTime\"",
        "\"durationMinutes\"",
        "\"createdBy\"",
        "\"createdAt\"",
        "\"note\"",
        "\"withChan\"",
    ] {
        assert!(raw.contains(field), "missing {field} in {raw}");
    }
    assert!(raw.contains("\"2026-09-01\""));
    assert!(raw.contains("\"10:00\""));

    let reopened = JsonStore::open(&path).unwrap();
    let loaded = reopened.list(Some(day()));
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, booked.id);
    assert_eq!(loaded[0].duration_minutes, 120);
    assert!(loaded[0].with_chan);
}

#[test]
fn statusless_legacy_files_load_as_confirmed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookings.json");
    // fiche écrite par la variante sans workflow de validation
    fs::write(
        &path,
        r#"[{
            "id": "legacy-1",
            "dateISO": "2026-09-01",
            "startTime": "18:00",
            "endTime": "24:00",
            "durationMinutes": 360,
            "createdBy": 7,
            "createdAt": "2026-08-01T10:00:00Z",
            "withChan": false
        }]"#,
    )
    .unwrap();

    let store = JsonStore::open(&path).unwrap();
    let loaded = store.list(None);
    assert_eq!(loaded.len(), 1);
    let b: &Booking = &loaded[0];
    assert_eq!(b.status, BookingStatus::Confirmed);
    assert_eq!(b.end_time.to_string(), "24:00");
    assert!(b.end_time.is_day_end());
    assert!(b.note.is_none());
}

#[test]
fn failed_persist_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    // répertoire parent absent : l'écriture atomique échoue
    let path = dir.path().join("missing").join("bookings.json");
    let store = JsonStore::open(&path).unwrap();
    let mut e = Engine::new(store, ScheduleSettings::default());

    let outcome = e.book(CreateBookingRequest {
        date: day(),
        start: "10:00".to_string(),
        end: "12:00".to_string(),
        created_by: 1,
        with_chan: false,
        force_chan: false,
        note: None,
    });
    assert!(outcome.is_err());
    // ni la liste en mémoire ni la révision n'ont bougé
    assert!(e.store().list(None).is_empty());
    assert_eq!(e.store().revision(), 0);
}

#[test]
fn mutations_bump_the_revision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookings.json");
    let mut store = JsonStore::open(&path).unwrap();
    assert_eq!(store.revision(), 0);

    let mut e = Engine::new(store, ScheduleSettings::default());
    let b = e
        .book(CreateBookingRequest {
            date: day(),
            start: "10:00".to_string(),
            end: "12:00".to_string(),
            created_by: 1,
            with_chan: false,
            force_chan: false,
            note: None,
        })
        .unwrap();
    assert_eq!(e.store().revision(), 1);

    e.remove(&b.id).unwrap();
    assert_eq!(e.store().revision(), 2);

    // suppression sans effet : révision inchangée
    store = JsonStore::open(&path).unwrap();
    assert!(!store.remove(&b.id).unwrap());
    assert_eq!(store.revision(), 0);
}
