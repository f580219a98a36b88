//! `licwarden-reports` — fleet-wide snapshots over the entity store.
//!
//! Every report is re-derived from current store state on each call; there
//! is no caching and no incremental update. The reference date (`today`) is
//! supplied by the caller for deterministic output.

pub mod compliance;
pub mod dashboard;
pub mod inventory;
pub mod service;

pub use compliance::{ComplianceReport, ComplianceSummary, LicenseComplianceRow};
pub use dashboard::DashboardSummary;
pub use inventory::{
    DeviceInventoryReport, DeviceInventoryRow, VendorAnalysisReport, VendorAnalysisRow,
};
pub use service::ReportService;
