//! Store-backed audit recorder.

use licwarden_audit::{AuditEntry, AuditError, AuditSink};

use crate::contract::EntityStore;

/// Audit sink that appends entries to the entity store's audit trail.
///
/// The write shares nothing with the triggering command's own store
/// operation: a failure here surfaces as `AuditError` and the caller logs
/// and moves on.
#[derive(Debug)]
pub struct StoreAuditSink<S> {
    store: S,
}

impl<S> StoreAuditSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> AuditSink for StoreAuditSink<S>
where
    S: EntityStore,
{
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.store
            .append_audit(entry)
            .map_err(|e| AuditError(e.to_string()))
    }
}
