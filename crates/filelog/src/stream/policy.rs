//! Rotation policy
//!
//! Decides, once per dequeued snapshot and before it is written, whether
//! the active file must be rotated:
//!
//! 1. The wall-clock hour moved past the stream's hour bucket: archive.
//! 2. Otherwise the active file is larger than [`MAX_FILE_SIZE`]: split.
//! 3. Otherwise nothing.
//!
//! The hour check short-circuits the size check, so a single cycle never
//! asks for both.

use std::fmt;
use std::io;

use chrono::{NaiveDateTime, Timelike};

use crate::MAX_FILE_SIZE;

/// Wall-clock time truncated to the hour, in local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourBucket(NaiveDateTime);

impl HourBucket {
    /// Truncate a local timestamp to its hour
    pub fn of(now: NaiveDateTime) -> Self {
        let hour = now
            .date()
            .and_hms_opt(now.hour(), 0, 0)
            .unwrap_or(now);
        Self(hour)
    }

    /// `YYYYMMDDHH`, used as rotated file suffix
    pub fn file_suffix(&self) -> String {
        self.0.format("%Y%m%d%H").to_string()
    }

    /// `YYYY-MM-DD`, used as archive directory name
    pub fn date_dir(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Start of the bucket
    pub fn start(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_suffix())
    }
}

/// What the rotator must do before the next write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationDecision {
    /// Active file exceeded the size threshold
    pub split: bool,
    /// Hour boundary passed; rotate and archive the finished hour
    pub archive: bool,
}

impl RotationDecision {
    /// No rotation this cycle
    pub const NONE: Self = Self {
        split: false,
        archive: false,
    };

    /// Size-triggered split
    pub const SPLIT: Self = Self {
        split: true,
        archive: false,
    };

    /// Hour-triggered rotation
    pub const ARCHIVE: Self = Self {
        split: false,
        archive: true,
    };

    /// Whether any file operation is needed
    pub fn is_none(&self) -> bool {
        !self.split && !self.archive
    }
}

/// Outcome of evaluating the policy
#[derive(Debug)]
pub enum Evaluation {
    /// Stat succeeded (or was skipped by the hour check)
    Decided(RotationDecision),
    /// The active file vanished; it must be recreated, no rotation
    FileMissing,
    /// Stat failed for another reason; keep logging, skip rotation
    StatFailed(io::Error),
}

impl Evaluation {
    /// Rotation to perform; missing or unreadable files never rotate
    pub fn decision(&self) -> RotationDecision {
        match self {
            Self::Decided(decision) => *decision,
            Self::FileMissing | Self::StatFailed(_) => RotationDecision::NONE,
        }
    }
}

/// Evaluate the policy
///
/// `file_size` is only called when the hour has not changed.
pub fn evaluate(
    now: HourBucket,
    current: HourBucket,
    file_size: impl FnOnce() -> io::Result<u64>,
) -> Evaluation {
    if now > current {
        return Evaluation::Decided(RotationDecision::ARCHIVE);
    }

    match file_size() {
        Ok(size) if size > MAX_FILE_SIZE => Evaluation::Decided(RotationDecision::SPLIT),
        Ok(_) => Evaluation::Decided(RotationDecision::NONE),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Evaluation::FileMissing,
        Err(e) => Evaluation::StatFailed(e),
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
