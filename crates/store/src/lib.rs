//! `licwarden-store` — durable storage contract and implementations.
//!
//! The [`EntityStore`] trait is the single shared mutable resource of the
//! system. The in-memory implementation backs tests and development; the
//! Postgres implementation (behind the `postgres` feature) backs production.

pub mod contract;
pub mod in_memory;
pub mod recorder;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use contract::{
    AssignmentFilter, DeviceFilter, EntityStore, LicenseFilter, StoreError,
};
pub use in_memory::InMemoryEntityStore;
pub use recorder::StoreAuditSink;

#[cfg(feature = "postgres")]
pub use postgres::PostgresEntityStore;
