//! Hot-reloadable structured logging for flow controllers.
//!
//! A [`Logger`] owns a writer and an active [`Backend`]. Records are ordered
//! key/value fields; the backend encodes them as logfmt or JSON, drops records
//! below the configured level and stamps every record with a UTC `ts` field.
//!
//! [`Logger::update`] rebuilds the backend from new [`LogOptions`] and swaps it
//! in one step, so concurrent callers of [`Logger::log`] always see either the
//! old backend or the new one, never a half-built chain.
//!
//! ```
//! use flow_logging::{LogFormat, LogLevel, LogOptions, Logger};
//! use serde_json::json;
//!
//! let logger = Logger::new(std::io::sink(), LogOptions::new(LogFormat::Logfmt, LogLevel::Info))?;
//! logger.log(&[("level", json!("info")), ("msg", json!("hi"))])?;
//!
//! logger.update(LogOptions::new(LogFormat::Json, LogLevel::Debug))?;
//! # Ok::<(), flow_logging::LoggingError>(())
//! ```

mod backend;
mod encoder;
mod error;
mod facade;
mod layer;
mod options;
mod writer;

pub use backend::Backend;
pub use encoder::Encoder;
pub use error::LoggingError;
pub use facade::{ContextLogger, Logger};
pub use layer::FacadeLayer;
pub use options::{LogFormat, LogLevel, LogOptions};
pub use writer::SyncWriter;

/// Name of the field carrying a record's level.
pub const LEVEL_KEY: &str = "level";

/// Name of the timestamp field injected into every record.
pub const TIMESTAMP_KEY: &str = "ts";
