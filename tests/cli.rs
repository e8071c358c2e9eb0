#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;

fn cli(data: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("banya-cli").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

#[test]
fn book_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bookings.json");

    cli(&data)
        .args(["book", "--date", "2026-09-01", "--start", "10:00", "--end", "12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10:00-12:00"));

    cli(&data)
        .args(["list", "--date", "2026-09-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Confirmed"));
}

#[test]
fn overlapping_booking_fails_with_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bookings.json");

    cli(&data)
        .args(["book", "--date", "2026-09-01", "--start", "14:00", "--end", "16:00"])
        .assert()
        .success();

    cli(&data)
        .args(["book", "--date", "2026-09-01", "--start", "13:00", "--end", "15:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlaps"));
}

#[test]
fn malformed_time_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bookings.json");

    cli(&data)
        .args(["book", "--date", "2026-09-01", "--start", "9h00", "--end", "12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed time"));
}

#[test]
fn check_warns_on_tight_gap_with_exit_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bookings.json");

    cli(&data)
        .args(["book", "--date", "2026-09-01", "--start", "10:00", "--end", "12:00"])
        .assert()
        .success();

    cli(&data)
        .args(["check", "--date", "2026-09-01", "--start", "13:00", "--end", "15:00"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tight gap"));

    cli(&data)
        .args(["check", "--date", "2026-09-01", "--start", "14:00", "--end", "16:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no tight gap"));
}

#[test]
fn grid_renders_the_day() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("bookings.json");

    cli(&data)
        .args(["grid", "--date", "2026-09-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libre"));
}
