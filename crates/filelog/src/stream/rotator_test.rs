//! Tests for the file rotator

use super::*;
use crate::MAX_FILE_SIZE;
use chrono::NaiveDate;
use tempfile::TempDir;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 17)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn rotator(dir: &TempDir, history: Option<PathBuf>) -> FileRotator {
    FileRotator::open(
        "app-access".into(),
        dir.path().join("app-access.log"),
        history,
        at(10, 0),
        Arc::new(StreamMetrics::new()),
    )
    .expect("open rotator")
}

fn inflate(path: &Path) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(MAX_FILE_SIZE + 1).unwrap();
}

#[test]
fn test_open_creates_active_file() {
    let dir = TempDir::new().unwrap();
    let r = rotator(&dir, None);
    assert!(r.path().exists());
    assert!(r.is_open());
    assert_eq!(r.sequence(), 0);
    assert_eq!(r.hour(), HourBucket::of(at(10, 0)));
}

#[test]
fn test_open_in_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let result = FileRotator::open(
        "x".into(),
        dir.path().join("missing/app.log"),
        None,
        at(10, 0),
        Arc::new(StreamMetrics::new()),
    );
    assert!(result.is_err());
}

#[test]
fn test_write_appends_to_existing_content() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app-access.log"), "old|").unwrap();
    let mut r = rotator(&dir, None);
    r.write_all(b"new").unwrap();
    r.sync().unwrap();
    assert_eq!(fs::read_to_string(r.path()).unwrap(), "old|new");
}

#[test]
fn test_no_rotation_when_small_and_same_hour() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    assert_eq!(r.rotate_if_needed(at(10, 59)), RotationDecision::NONE);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_split_renames_with_sequence() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    r.write_all(b"first chunk").unwrap();
    inflate(r.path());

    assert_eq!(r.rotate_if_needed(at(10, 30)), RotationDecision::SPLIT);
    assert_eq!(r.sequence(), 1);

    let rotated = dir.path().join("app-access.log.2026101710.0");
    assert!(rotated.exists());
    assert_eq!(fs::metadata(r.path()).unwrap().len(), 0);

    r.write_all(b"after").unwrap();
    assert_eq!(fs::read_to_string(r.path()).unwrap(), "after");
}

#[test]
fn test_split_overwrites_wrapped_sequence_file() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    let stale = dir.path().join("app-access.log.2026101710.0");
    fs::write(&stale, "stale").unwrap();

    r.write_all(b"fresh").unwrap();
    r.split(false, at(10, 5));
    assert_eq!(fs::read_to_string(&stale).unwrap(), "fresh");
}

#[test]
fn test_hour_rotation_without_splits_has_no_suffix() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    r.write_all(b"ten o'clock").unwrap();

    assert_eq!(r.rotate_if_needed(at(11, 0)), RotationDecision::ARCHIVE);

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "app-access.log")
        .collect();
    assert_eq!(names, vec!["app-access.log.2026101710".to_string()]);
    assert_eq!(
        fs::read_to_string(dir.path().join("app-access.log.2026101710")).unwrap(),
        "ten o'clock"
    );
    assert_eq!(r.hour(), HourBucket::of(at(11, 0)));
    assert_eq!(r.sequence(), 0);
}

#[test]
fn test_hour_rotation_after_split_takes_next_sequence() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    r.split(false, at(10, 10));
    r.split(false, at(10, 20));
    r.write_all(b"tail").unwrap();

    r.archive_on_hour(at(11, 0));

    assert!(dir.path().join("app-access.log.2026101710.0").exists());
    assert!(dir.path().join("app-access.log.2026101710.1").exists());
    let last = dir.path().join("app-access.log.2026101710.2");
    assert_eq!(fs::read_to_string(last).unwrap(), "tail");
    assert!(!dir.path().join("app-access.log.2026101710").exists());
    assert_eq!(r.sequence(), 0);
}

#[test]
fn test_split_with_hour_passed_resets_sequence() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    r.apply(
        RotationDecision {
            split: true,
            archive: true,
        },
        at(11, 0),
    );
    assert!(dir.path().join("app-access.log.2026101710.0").exists());
    assert_eq!(r.sequence(), 0);
    assert_eq!(r.hour(), HourBucket::of(at(11, 0)));
}

#[test]
fn test_missing_file_is_recreated() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    fs::remove_file(r.path()).unwrap();

    assert_eq!(r.rotate_if_needed(at(10, 1)), RotationDecision::NONE);
    assert!(r.path().exists());

    r.write_all(b"pending").unwrap();
    assert_eq!(fs::read_to_string(r.path()).unwrap(), "pending");
}

#[test]
fn test_write_without_handle_fails() {
    let dir = TempDir::new().unwrap();
    let mut r = rotator(&dir, None);
    r.close();
    assert!(!r.is_open());
    assert!(r.write_all(b"x").is_err());
    assert!(r.sync().is_ok());
}

#[tokio::test]
async fn test_hour_rotation_archives_into_history() {
    let dir = TempDir::new().unwrap();
    let history = dir.path().join("history");
    let mut r = rotator(&dir, Some(history.clone()));
    r.write_all(b"archived").unwrap();

    r.rotate_if_needed(at(11, 2));
    r.wait_for_archives().await;

    let archived = history.join("2026-10-17/app-access.log.2026101710");
    assert_eq!(fs::read_to_string(archived).unwrap(), "archived");
    assert!(!dir.path().join("app-access.log.2026101710").exists());
}
