//! File naming convention
//!
//! ```text
//! <log_dir>/<component>-<category>[-<level>].log       active file
//! <active>.<YYYYMMDDHH>                                first rotation of an hour
//! <active>.<YYYYMMDDHH>.<seq>                          sequence-numbered rotation
//! <history_dir>/<YYYY-MM-DD>/<rotated file name>       archived file
//! ```
//!
//! These names are read by external tooling and must not change.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::policy::HourBucket;
use crate::MAX_SEQUENCE_FILES;

/// Active file name for a stream
pub fn active_file_name(component: &str, category: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("{component}-{category}-{q}.log"),
        None => format!("{component}-{category}.log"),
    }
}

/// Path an active file is renamed to on rotation
///
/// `sequence` is reduced modulo [`MAX_SEQUENCE_FILES`]; `None` yields the
/// unnumbered hourly name.
pub fn rotated_path(active: &Path, hour: HourBucket, sequence: Option<u32>) -> PathBuf {
    let mut name = OsString::from(active.as_os_str());
    name.push(".");
    name.push(hour.file_suffix());
    if let Some(seq) = sequence {
        name.push(format!(".{}", seq % MAX_SEQUENCE_FILES));
    }
    PathBuf::from(name)
}

/// Every rotated file an hour can leave behind, unnumbered first
pub fn rotated_candidates(active: &Path, hour: HourBucket) -> impl Iterator<Item = PathBuf> + '_ {
    std::iter::once(rotated_path(active, hour, None))
        .chain((0..MAX_SEQUENCE_FILES).map(move |seq| rotated_path(active, hour, Some(seq))))
}

/// Archive directory for an hour
pub fn archive_dir(history_dir: &Path, hour: HourBucket) -> PathBuf {
    history_dir.join(hour.date_dir())
}
