//! `licwarden-registry` — validated CRUD over the tracked entities.
//!
//! The thin service layer between the API surface and the entity store:
//! uniqueness and reference checks, command validation, cascade semantics,
//! and one audit entry per successful mutation.

pub mod devices;
pub mod licenses;
pub mod software;
pub mod vendors;

pub use devices::DeviceRegistry;
pub use licenses::LicenseRegistry;
pub use software::{SoftwareVersionRegistry, VersionStatusSummary};
pub use vendors::VendorRegistry;
