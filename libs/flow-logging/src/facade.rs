use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::backend::Backend;
use crate::error::LoggingError;
use crate::options::LogOptions;
use crate::writer::SyncWriter;

/// Structured logger whose backend can be reconfigured at runtime.
///
/// Callers keep one `Logger` (usually behind an `Arc`) for the process
/// lifetime; [`Logger::update`] swaps the encoding and level in place.
#[derive(Debug)]
pub struct Logger {
    writer: SyncWriter,
    backend: RwLock<Arc<Backend>>,
}

impl Logger {
    /// Creates a logger writing to `writer`.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidFormat`] if `options.format` is unknown.
    pub fn new<W>(writer: W, options: LogOptions) -> Result<Self, LoggingError>
    where
        W: Write + Send + 'static,
    {
        Self::with_writer(SyncWriter::new(writer), options)
    }

    /// Creates a logger on an existing shared writer.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidFormat`] if `options.format` is unknown.
    pub fn with_writer(writer: SyncWriter, options: LogOptions) -> Result<Self, LoggingError> {
        let backend = Backend::build(writer.clone(), options)?;
        Ok(Self {
            writer,
            backend: RwLock::new(Arc::new(backend)),
        })
    }

    /// Writes one record through the active backend.
    ///
    /// # Errors
    /// Returns the backend's encoding or write error unchanged.
    pub fn log(&self, fields: &[(&str, Value)]) -> Result<(), LoggingError> {
        let backend = self.backend.read();
        backend.log(fields)
    }

    /// Rebuilds the backend from `options` and swaps it in.
    ///
    /// The new backend is fully built before the write lock is taken. On
    /// failure the active backend is left untouched.
    ///
    /// # Errors
    /// Returns [`LoggingError::InvalidFormat`] if `options.format` is unknown.
    pub fn update(&self, options: LogOptions) -> Result<(), LoggingError> {
        let next = Arc::new(Backend::build(self.writer.clone(), options)?);
        *self.backend.write() = next;
        Ok(())
    }

    /// Options of the backend currently in use.
    #[must_use]
    pub fn options(&self) -> LogOptions {
        self.backend.read().options().clone()
    }

    /// Returns a child logger that prepends `fields` to every record.
    ///
    /// The child writes through this logger, so it follows later updates.
    #[must_use]
    pub fn with<K, I>(self: &Arc<Self>, fields: I) -> ContextLogger
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        ContextLogger {
            parent: Arc::clone(self),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A [`Logger`] view carrying fixed leading fields, e.g. `component=<id>`.
#[derive(Debug, Clone)]
pub struct ContextLogger {
    parent: Arc<Logger>,
    fields: Vec<(String, Value)>,
}

impl ContextLogger {
    /// Writes the context fields followed by `fields`.
    ///
    /// # Errors
    /// Same as [`Logger::log`].
    pub fn log(&self, fields: &[(&str, Value)]) -> Result<(), LoggingError> {
        let mut record: Vec<(&str, Value)> = Vec::with_capacity(self.fields.len() + fields.len());
        record.extend(self.fields.iter().map(|(k, v)| (k.as_str(), v.clone())));
        record.extend(fields.iter().map(|(k, v)| (*k, v.clone())));
        self.parent.log(&record)
    }

    /// Nests further context on top of this one.
    #[must_use]
    pub fn with<K, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut all = self.fields.clone();
        all.extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        Self {
            parent: Arc::clone(&self.parent),
            fields: all,
        }
    }

    #[must_use]
    pub fn parent(&self) -> &Arc<Logger> {
        &self.parent
    }
}
