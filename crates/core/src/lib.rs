//! `licwarden-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod ip;
pub mod window;

pub use error::{DomainError, DomainResult, EntityKind};
pub use id::{AssignmentId, DeviceId, LicenseKey, SoftwareVersionId, UserId, VendorId};
pub use ip::IpAddress;
pub use window::ValidityWindow;
