use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared handle to the physical log destination.
///
/// Clones share one mutex, so every backend built on the same writer takes
/// turns: one record is fully written and flushed before the next starts.
#[derive(Clone)]
pub struct SyncWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SyncWriter {
    #[must_use]
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes one encoded record as a single unit.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    pub fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut w = self.inner.lock();
        w.write_all(record)?;
        w.flush()
    }
}

impl std::fmt::Debug for SyncWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncWriter").finish_non_exhaustive()
    }
}
