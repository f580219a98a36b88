//! `licwarden-risk` — expiry and capacity risk scoring.
//!
//! Pure functions over already-fetched entities: no store access, no clocks.
//! `today` is always a parameter, which keeps every classification and list
//! deterministic under test.

pub mod alerts;
pub mod device_risk;
pub mod severity;

pub use alerts::{expiring_licenses, overused_licenses, CapacityAlert, ExpiryAlert, LicenseUsage};
pub use device_risk::{
    device_risk, devices_at_risk, DeviceRiskReport, DeviceRiskSeverity, ExpiringLicenseDetail,
};
pub use severity::{ExpirySeverity, UsageSeverity};
