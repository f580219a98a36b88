//! `licwarden-devices` — network device and software-version records.

pub mod device;
pub mod software;

pub use device::{Device, DeviceStatus, DeviceUpdate, NewDevice};
pub use software::{NewSoftwareVersion, SoftwareVersion, SoftwareVersionUpdate, VersionStatus};
