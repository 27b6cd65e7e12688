//! Stdout logger
//!
//! Used when no log directory is configured. Records use the same line
//! format as files and are printed unbuffered; there is nothing to flush
//! on shutdown.

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Local;

use crate::format::{RAW_TAG, format_line};
use crate::level::Level;

/// Level-gated logger printing to stdout
///
/// Clones share the threshold.
#[derive(Debug, Clone)]
pub struct StdoutLogger {
    level: Arc<AtomicU8>,
}

impl StdoutLogger {
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    /// Print a record at `level` if the threshold allows it
    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        if let Some(line) = self.render(level, Location::caller(), message) {
            print!("{line}");
        }
    }

    /// Print an ungated record tagged with `name`
    #[track_caller]
    pub fn write_raw(&self, name: &str, message: &str) {
        let now = Local::now().naive_local();
        print!("{}", format_line(now, RAW_TAG, Location::caller(), message, name));
    }

    fn render(&self, level: Level, caller: &Location<'_>, message: &str) -> Option<String> {
        if !self.enabled(level) {
            return None;
        }
        Some(format_line(
            Local::now().naive_local(),
            level.as_str(),
            caller,
            message,
            "",
        ))
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new(Level::default())
    }
}
