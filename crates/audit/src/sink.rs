use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::entry::AuditEntry;

/// Audit write failure.
///
/// Deliberately opaque: the recorder is best-effort and callers only ever
/// log this, they never branch on it.
#[derive(Debug, Error)]
#[error("audit write failed: {0}")]
pub struct AuditError(pub String);

/// Destination for audit entries.
///
/// Implementations must not block the caller beyond the write itself and
/// must never panic on failure; they report errors through the result and
/// leave the decision (log-and-continue) to the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        (**self).record(entry)
    }
}

/// Capturing sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError("lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
}
