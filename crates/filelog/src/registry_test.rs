//! Tests for the logger registry

use super::*;
use crate::level::Level;
use std::time::Duration;
use tempfile::TempDir;

fn registry(dir: &TempDir) -> Registry {
    let config = FileLogConfig::default()
        .with_log_dir(dir.path().join("now"))
        .with_history_dir(dir.path().join("history"));
    Registry::with_options(
        config,
        StreamOptions::default().with_flush_interval(Duration::from_millis(20)),
    )
}

#[tokio::test]
async fn test_file_logger_creates_directories() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    registry.file_logger("gateway", "access", None).unwrap();

    assert!(dir.path().join("now/gateway-access-trace.log").exists());
    assert!(dir.path().join("history").is_dir());
    registry.shutdown_all().await;
}

#[tokio::test]
async fn test_same_key_returns_cached_logger() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let a = registry.file_logger("gateway", "access", None).unwrap();
    let b = registry.file_logger("gateway", "access", Some("ignored")).unwrap();
    let c = registry.file_logger("gateway", "errors", None).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(registry.len(), 2);
    registry.shutdown_all().await;
}

#[tokio::test]
async fn test_unwritable_log_dir_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();
    let registry = Registry::new(FileLogConfig::default().with_log_dir(blocker.join("now")));

    let err = registry.file_logger("gateway", "access", None).unwrap_err();
    assert!(matches!(err, FileLogError::CreateDir { .. }));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_invalid_component_rejected() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let err = registry.file_logger("a/b", "access", None).unwrap_err();
    assert!(matches!(err, FileLogError::InvalidName { .. }));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_logger_picks_stdout_without_log_dir() {
    let registry = Registry::new(FileLogConfig::stdout(Level::Warn));
    let logger = registry.logger("gateway", "access", None).unwrap();
    assert!(matches!(logger, Logger::Stdout(_)));
    assert_eq!(logger.level(), Level::Warn);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_logger_picks_file_with_log_dir() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let logger = registry.logger("gateway", "access", None).unwrap();
    assert!(matches!(logger, Logger::File(_)));
    registry.shutdown_all().await;
}

#[tokio::test]
async fn test_shutdown_all_flushes_every_logger() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);
    let access = registry.file_logger("gateway", "access", None).unwrap();
    let errors = registry.file_logger("gateway", "errors", None).unwrap();

    access.trace("request");
    errors.error("failure");
    registry.shutdown_all().await;

    let now = dir.path().join("now");
    let trace = std::fs::read_to_string(now.join("gateway-access-trace.log")).unwrap();
    assert!(trace.ends_with("|request\n"));
    let error = std::fs::read_to_string(now.join("gateway-errors-error.log")).unwrap();
    assert!(error.ends_with("|failure\n"));
}

#[test]
fn test_file_logger_outside_runtime_fails() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir);

    let err = registry.file_logger("gateway", "access", None).unwrap_err();
    assert!(matches!(err, FileLogError::NoRuntime { .. }));
    assert!(registry.is_empty());

    // Same key succeeds once a runtime is available
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        registry.file_logger("gateway", "access", None).unwrap();
        registry.shutdown_all().await;
    });
    assert_eq!(registry.len(), 1);
}
