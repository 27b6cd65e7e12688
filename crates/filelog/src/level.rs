//! Log levels and level gating

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Severity of a log record
///
/// Ordered from most to least verbose. A logger with threshold `Warn`
/// accepts `Warn` and `Error` records only.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Debugging detail
    Debug = 0,
    /// Normal operation (default threshold)
    #[default]
    Trace = 1,
    /// Something unexpected that did not fail the operation
    Warn = 2,
    /// A failed operation
    Error = 3,
}

impl Level {
    /// All levels, most verbose first
    pub const ALL: [Level; 4] = [Level::Debug, Level::Trace, Level::Warn, Level::Error];

    /// Name used in file names and record prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Whether a record at `level` passes this threshold
    #[inline]
    pub fn enables(self, level: Level) -> bool {
        self <= level
    }

    pub(crate) fn from_u8(value: u8) -> Level {
        match value {
            0 => Self::Debug,
            1 => Self::Trace,
            2 => Self::Warn,
            _ => Self::Error,
        }
    }

    /// Position in [`Level::ALL`]
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Trace);
        assert!(Level::Trace < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_enables() {
        assert!(Level::Debug.enables(Level::Debug));
        assert!(Level::Debug.enables(Level::Error));
        assert!(!Level::Warn.enables(Level::Trace));
        assert!(Level::Warn.enables(Level::Warn));
        assert!(!Level::Error.enables(Level::Warn));
    }

    #[test]
    fn test_round_trip_u8() {
        for level in Level::ALL {
            assert_eq!(Level::from_u8(level as u8), level);
        }
        assert_eq!(Level::from_u8(42), Level::Error);
    }

    #[test]
    fn test_parse() {
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" debug ".parse::<Level>(), Ok(Level::Debug));
        assert!("info".parse::<Level>().is_err());
    }

    #[test]
    fn test_default_is_trace() {
        assert_eq!(Level::default(), Level::Trace);
    }
}
