//! Tests for the archiver

use super::*;
use crate::stream::naming::rotated_path;
use chrono::NaiveDate;
use tempfile::TempDir;

fn hour() -> HourBucket {
    HourBucket::of(
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap(),
    )
}

struct Dirs {
    _root: TempDir,
    now: PathBuf,
    history: PathBuf,
}

fn dirs() -> Dirs {
    let root = TempDir::new().expect("temp dir");
    let now = root.path().join("now");
    let history = root.path().join("history");
    fs::create_dir_all(&now).unwrap();
    Dirs {
        _root: root,
        now,
        history,
    }
}

#[test]
fn test_moves_hourly_and_sequence_files() {
    let d = dirs();
    let active = d.now.join("app-access.log");
    fs::write(rotated_path(&active, hour(), None), "hour").unwrap();
    fs::write(rotated_path(&active, hour(), Some(0)), "seq0").unwrap();
    fs::write(rotated_path(&active, hour(), Some(4)), "seq4").unwrap();

    let moved = archive_hour(&d.history, &active, hour()).unwrap();
    assert_eq!(moved, 3);

    let day = d.history.join("2026-10-17");
    assert_eq!(
        fs::read_to_string(day.join("app-access.log.2026101713")).unwrap(),
        "hour"
    );
    assert_eq!(
        fs::read_to_string(day.join("app-access.log.2026101713.0")).unwrap(),
        "seq0"
    );
    assert_eq!(
        fs::read_to_string(day.join("app-access.log.2026101713.4")).unwrap(),
        "seq4"
    );
    assert!(!rotated_path(&active, hour(), None).exists());
}

#[test]
fn test_nothing_to_move_still_creates_date_dir() {
    let d = dirs();
    let active = d.now.join("app-access.log");
    let moved = archive_hour(&d.history, &active, hour()).unwrap();
    assert_eq!(moved, 0);
    assert!(d.history.join("2026-10-17").is_dir());
}

#[test]
fn test_existing_destination_overwritten() {
    let d = dirs();
    let active = d.now.join("app-access.log");
    let day = d.history.join("2026-10-17");
    fs::create_dir_all(&day).unwrap();
    fs::write(day.join("app-access.log.2026101713"), "stale").unwrap();
    fs::write(rotated_path(&active, hour(), None), "fresh").unwrap();

    archive_hour(&d.history, &active, hour()).unwrap();
    assert_eq!(
        fs::read_to_string(day.join("app-access.log.2026101713")).unwrap(),
        "fresh"
    );
}

#[test]
fn test_other_hours_untouched() {
    let d = dirs();
    let active = d.now.join("app-access.log");
    let other = d.now.join("app-access.log.2026101712");
    fs::write(&other, "older").unwrap();

    archive_hour(&d.history, &active, hour()).unwrap();
    assert!(other.exists());
}

#[tokio::test]
async fn test_scheduled_archive_records_metrics() {
    let d = dirs();
    let active = d.now.join("app-access.log");
    fs::write(rotated_path(&active, hour(), None), "hour").unwrap();

    let metrics = Arc::new(StreamMetrics::new());
    let mut archiver = Archiver::new("app-access".into(), d.history.clone(), Arc::clone(&metrics));
    archiver.schedule(active, hour());
    archiver.wait().await;

    assert_eq!(archiver.pending(), 0);
    assert_eq!(metrics.snapshot().files_archived, 1);
    assert!(d.history.join("2026-10-17/app-access.log.2026101713").exists());
}
