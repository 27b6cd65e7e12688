//! Record formatting
//!
//! Every record is a single line:
//!
//! ```text
//! 2026-10-17 10:04:05.123|warn|src/server.rs:88|connection reset|node-3
//! ```

use std::fmt::Write;
use std::panic::Location;

use chrono::NaiveDateTime;

/// Tag used for records written through `write_raw`
pub const RAW_TAG: &str = "Raw";

/// Render one record
///
/// Trailing newlines of `message` are trimmed; an empty `suffix` is
/// omitted together with its separator.
pub fn format_line(
    now: NaiveDateTime,
    tag: &str,
    caller: &Location<'_>,
    message: &str,
    suffix: &str,
) -> String {
    let message = message.trim_end_matches(['\n', '\r']);
    let mut line = String::with_capacity(40 + tag.len() + message.len() + suffix.len());

    // Writing into a String cannot fail
    let _ = write!(
        line,
        "{}|{}|{}:{}|{}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        tag,
        caller.file(),
        caller.line(),
        message
    );
    if !suffix.is_empty() {
        line.push('|');
        line.push_str(suffix);
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_milli_opt(9, 5, 7, 42)
            .unwrap()
    }

    #[test]
    fn test_format_without_suffix() {
        let here = Location::caller();
        let line = format_line(ts(), "trace", here, "hello", "");
        assert_eq!(
            line,
            format!("2026-10-17 09:05:07.042|trace|{}:{}|hello\n", here.file(), here.line())
        );
    }

    #[test]
    fn test_format_with_suffix() {
        let line = format_line(ts(), "error", Location::caller(), "boom", "node-1");
        assert!(line.ends_with("|boom|node-1\n"));
    }

    #[test]
    fn test_trailing_newlines_trimmed() {
        let line = format_line(ts(), "warn", Location::caller(), "one\n\n", "");
        assert!(line.ends_with("|one\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_caller_points_at_this_file() {
        let line = format_line(ts(), "debug", Location::caller(), "x", "");
        assert!(line.contains("format.rs:"));
    }
}
