//! Options used to (re)build a log backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoggingError;

/// Encoding used for emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    /// `key=value` pairs separated by spaces.
    Logfmt,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logfmt => "logfmt",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logfmt" => Ok(Self::Logfmt),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::InvalidFormat {
                format: s.to_owned(),
            }),
        }
    }
}

/// Minimum severity a record must carry to be written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Maps a `tracing` level onto the nearest threshold. `TRACE` folds into `debug`.
    #[must_use]
    pub fn from_tracing(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::InvalidLevel {
                level: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LoggingError;

    fn try_from(value: String) -> Result<Self, LoggingError> {
        value.parse()
    }
}

/// Logger configuration.
///
/// `format` keeps the configured name as written so that an unknown value is
/// reported by [`crate::Logger::new`] / [`crate::Logger::update`] rather than
/// silently replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogOptions {
    pub format: String,
    pub level: LogLevel,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::new(LogFormat::Logfmt, LogLevel::Info)
    }
}

impl LogOptions {
    #[must_use]
    pub fn new(format: LogFormat, level: LogLevel) -> Self {
        Self {
            format: format.as_str().to_owned(),
            level,
        }
    }

    /// Resolves the configured format name.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidFormat`] carrying the configured value when
    /// it is neither `logfmt` nor `json`.
    pub fn log_format(&self) -> Result<LogFormat, LoggingError> {
        self.format.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" logfmt ".parse::<LogFormat>().unwrap(), LogFormat::Logfmt);
    }

    #[test]
    fn unknown_format_keeps_offending_value() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        match err {
            LoggingError::InvalidFormat { format } => assert_eq!(format, "yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: LogOptions = serde_json::from_str(r#"{"level":"debug"}"#).unwrap();
        assert_eq!(opts.format, "logfmt");
        assert_eq!(opts.level, LogLevel::Debug);

        let err = serde_json::from_str::<LogOptions>(r#"{"level":"loud"}"#).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn unknown_format_survives_deserialization() {
        let opts: LogOptions = serde_json::from_str(r#"{"format":"xml"}"#).unwrap();
        assert!(matches!(
            opts.log_format(),
            Err(LoggingError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn level_deserializes_through_string_conversion() {
        let opts: LogOptions = serde_json::from_str(r#"{"level":"WARNING"}"#).unwrap();
        assert_eq!(opts.level, LogLevel::Warn);
        assert_eq!(LogLevel::try_from("error".to_owned()).unwrap(), LogLevel::Error);
        assert!(matches!(
            LogLevel::try_from("loud".to_owned()),
            Err(LoggingError::InvalidLevel { .. })
        ));
        assert!(serde_json::from_str::<LogOptions>(r#"{"level":"loud"}"#).is_err());
    }
}
