#![forbid(unsafe_code)]
use banya::{
    check_gaps, classify_day, free_ranges, timerange, Booking, BookingId, BookingStatus,
    CellStatus, Engine, MemoryStore, ScheduleSettings, SegmentRenderer, TextGrid,
};
use chrono::{NaiveDate, Utc};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn booking(start: &str, end: &str) -> Booking {
    let start_time = start.parse().unwrap();
    let end_time: banya::WallTime = end.parse().unwrap();
    Booking {
        id: BookingId::random(),
        date: day(),
        start_time,
        end_time,
        duration_minutes: i64::from(end_time.minutes()) - i64::from(start_time.minutes()),
        created_by: 1,
        created_at: Utc::now(),
        note: None,
        with_chan: false,
        status: BookingStatus::Confirmed,
        status_reason: None,
    }
}

fn wall(range: &timerange::TimeRange) -> (String, String) {
    (
        range.start.format("%H:%M").to_string(),
        range.end.format("%H:%M").to_string(),
    )
}

#[test]
fn free_ranges_are_the_complement_of_bookings() {
    let settings = ScheduleSettings::default();
    let bookings = vec![booking("10:00", "12:00"), booking("14:00", "16:00")];

    let free = free_ranges(day(), &bookings, &settings);
    let labels: Vec<(String, String)> = free.iter().map(wall).collect();
    assert_eq!(
        labels,
        vec![
            ("09:00".to_string(), "10:00".to_string()),
            ("12:00".to_string(), "14:00".to_string()),
            ("16:00".to_string(), "23:00".to_string()),
        ]
    );
}

#[test]
fn free_ranges_ignore_cancelled_and_unsorted_input() {
    let settings = ScheduleSettings::default();
    let mut cancelled = booking("12:00", "14:00");
    cancelled.status = BookingStatus::Cancelled;
    // non trié volontairement
    let bookings = vec![booking("14:00", "16:00"), cancelled, booking("09:00", "11:00")];

    let free = free_ranges(day(), &bookings, &settings);
    let labels: Vec<(String, String)> = free.iter().map(wall).collect();
    assert_eq!(
        labels,
        vec![
            ("11:00".to_string(), "14:00".to_string()),
            ("16:00".to_string(), "23:00".to_string()),
        ]
    );
}

#[test]
fn fully_booked_day_has_no_free_ranges() {
    let settings = ScheduleSettings::default();
    let bookings = vec![booking("09:00", "23:00")];
    assert!(free_ranges(day(), &bookings, &settings).is_empty());
}

#[test]
fn segments_partition_the_whole_day() {
    let settings = ScheduleSettings::default();
    let bookings = vec![booking("10:00", "12:00"), booking("15:00", "17:00")];

    let segments = classify_day(day(), &bookings, &settings);
    assert!(!segments.is_empty());
    assert_eq!(segments[0].start, settings.day_open);
    assert_eq!(segments.last().unwrap().end, settings.day_close);
    // contigus, sans trou ni double couverture
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn cleaning_buffer_follows_each_booking() {
    let settings = ScheduleSettings::default();
    let bookings = vec![booking("10:00", "12:00")];

    let segments = classify_day(day(), &bookings, &settings);
    let buffer = segments
        .iter()
        .find(|s| s.status == CellStatus::CleaningBuffer)
        .expect("a cleaning buffer segment");
    assert_eq!(buffer.start.to_string(), "12:00");
    assert_eq!(buffer.end.to_string(), "13:00");

    let booked = segments
        .iter()
        .find(|s| s.status == CellStatus::Booked)
        .expect("a booked segment");
    assert_eq!(booked.start.to_string(), "10:00");
    assert_eq!(booked.end.to_string(), "12:00");
}

#[test]
fn tail_of_day_too_tight_for_minimum_duration() {
    let settings = ScheduleSettings::default();
    let segments = classify_day(day(), &[], &settings);

    // journée vide : libre jusqu'à 21:00, puis trop court pour 120 min
    let tight = segments
        .iter()
        .find(|s| s.status == CellStatus::TooTight)
        .expect("a too-tight tail");
    assert_eq!(tight.start.to_string(), "21:30");
    assert_eq!(tight.end.to_string(), "23:00");
}

#[test]
fn adjacent_cells_are_run_length_merged() {
    let settings = ScheduleSettings::default();
    let segments = classify_day(day(), &[], &settings);
    for pair in segments.windows(2) {
        assert!(
            pair[0].status != pair[1].status || pair[0].chan_eligible != pair[1].chan_eligible,
            "adjacent segments must differ: {pair:?}"
        );
    }
    // l'éligibilité chan scinde la plage libre à 13:00
    assert!(segments
        .iter()
        .any(|s| s.start.to_string() == "13:00" && s.chan_eligible));
}

#[test]
fn tight_gap_is_flagged_before_commit() {
    let settings = ScheduleSettings::default();
    let bookings = vec![booking("10:00", "12:00")];

    // laisserait 60 min entre 12:00 et 13:00
    assert!(check_gaps(
        day(),
        "13:00".parse().unwrap(),
        "15:00".parse().unwrap(),
        &bookings,
        &settings
    ));
    // 120 min exactement : pas d'avertissement
    assert!(!check_gaps(
        day(),
        "14:00".parse().unwrap(),
        "16:00".parse().unwrap(),
        &bookings,
        &settings
    ));
    // contact direct : aucun trou
    assert!(!check_gaps(
        day(),
        "12:00".parse().unwrap(),
        "14:00".parse().unwrap(),
        &bookings,
        &settings
    ));
}

#[test]
fn late_gaps_are_exempt_from_the_warning() {
    let settings = ScheduleSettings::default();
    // seul créneau du jour : trou de 60 min en fin de journée,
    // mais il se termine après useful_day_end (21:00)
    assert!(!check_gaps(
        day(),
        "20:00".parse().unwrap(),
        "22:00".parse().unwrap(),
        &[],
        &settings
    ));
}

#[test]
fn text_grid_renders_one_line_per_segment() {
    let settings = ScheduleSettings::default();
    let mut e = Engine::new(MemoryStore::new(), settings);
    e.book(banya::CreateBookingRequest {
        date: day(),
        start: "10:00".to_string(),
        end: "12:00".to_string(),
        created_by: 1,
        with_chan: false,
        force_chan: false,
        note: None,
    })
    .unwrap();

    let segments = e.day_segments(day());
    let text = TextGrid.render(day(), &segments);
    assert!(text.contains("10:00-12:00 réservé"));
    assert!(text.contains("ménage"));
    assert_eq!(text.lines().count(), segments.len() + 1);
}
