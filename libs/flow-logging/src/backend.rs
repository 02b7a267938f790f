//! The encoder + level filter + writer chain behind a [`crate::Logger`].

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::encoder::Encoder;
use crate::error::LoggingError;
use crate::options::{LogLevel, LogOptions};
use crate::writer::SyncWriter;
use crate::{LEVEL_KEY, TIMESTAMP_KEY};

/// A fully built logging chain. Immutable once constructed.
#[derive(Debug)]
pub struct Backend {
    encoder: Encoder,
    threshold: LogLevel,
    writer: SyncWriter,
    options: LogOptions,
}

impl Backend {
    /// Builds a backend writing to `writer`.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidFormat`] when `options.format` is not a
    /// known encoding.
    pub fn build(writer: SyncWriter, options: LogOptions) -> Result<Self, LoggingError> {
        let format = options.log_format()?;
        Ok(Self {
            encoder: Encoder::from(format),
            threshold: options.level,
            writer,
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Writes one record unless its `level` field is below the threshold.
    ///
    /// Records without a recognizable `level` field are always written.
    ///
    /// # Errors
    /// Returns encoding or write failures unchanged.
    pub fn log(&self, fields: &[(&str, Value)]) -> Result<(), LoggingError> {
        if !self.allows(fields) {
            return Ok(());
        }

        let mut record = Vec::with_capacity(fields.len() + 1);
        record.push((TIMESTAMP_KEY, Value::String(timestamp_utc())));
        record.extend(fields.iter().map(|(k, v)| (*k, v.clone())));

        let line = self.encoder.encode(&record)?;
        self.writer.write_record(&line)?;
        Ok(())
    }

    fn allows(&self, fields: &[(&str, Value)]) -> bool {
        let level = fields
            .iter()
            .rev()
            .find(|(k, _)| *k == LEVEL_KEY)
            .and_then(|(_, v)| v.as_str())
            .and_then(|s| s.parse::<LogLevel>().ok());

        level.is_none_or(|l| l >= self.threshold)
    }
}

fn timestamp_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
