//! `licwarden-audit` — append-only audit trail contract.
//!
//! The audit trail is a best-effort side channel: every successful mutating
//! command emits exactly one entry, and a failed write must never roll back
//! or fail the triggering command. Callers log and swallow `AuditError`.

pub mod entry;
pub mod sink;

pub use entry::{AuditAction, AuditEntry};
pub use sink::{AuditError, AuditSink, InMemoryAuditSink, NullAuditSink};
