//! Storage contract for the allocation engine and its read sides.
//!
//! ## Design Principles
//!
//! - **No storage assumptions**: works with an in-memory implementation
//!   (tests/dev) and a Postgres backend (production).
//! - **Invariant-bearing inserts**: the assignment insert is conditional —
//!   uniqueness of the (license, device) pair and the capacity bound are
//!   re-checked atomically inside the store, so two racing writers cannot
//!   both get past a near-capacity license.
//! - **Read-then-delete in one step**: `delete_assignment` returns the
//!   removed row, so callers never need a separate racy read.
//!
//! ## Implementation Requirements
//!
//! Implementations must:
//! - enforce uniqueness of license keys, device ids and (license, device)
//!   assignment pairs;
//! - hold whatever lock/transaction is needed so that the duplicate check,
//!   the capacity count and the insert in `insert_assignment` observe a
//!   single consistent snapshot;
//! - cascade: deleting a license removes its assignments; deleting a device
//!   removes its assignments and software versions;
//! - expose stable list ordering (inputs to deterministic reports).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use licwarden_audit::AuditEntry;
use licwarden_core::{
    AssignmentId, DeviceId, DomainError, EntityKind, LicenseKey, SoftwareVersionId, VendorId,
};
use licwarden_devices::{Device, DeviceStatus, SoftwareVersion};
use licwarden_licenses::{Assignment, License, Vendor};

/// Storage operation error.
///
/// `DuplicateKey`, `DuplicateAssignment` and `CapacityExceeded` are
/// constraint rejections surfaced to the domain layer; `Unavailable` is an
/// infrastructure fault (connectivity, poisoned lock) and maps to the opaque
/// `DomainError::Store` kind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {key} already exists")]
    DuplicateKey { entity: EntityKind, key: String },

    #[error("license {license_key} already assigned to device {device_id}")]
    DuplicateAssignment {
        license_key: String,
        device_id: String,
    },

    #[error("license {license_key} at capacity ({current}/{limit})")]
    CapacityExceeded {
        license_key: String,
        current: u32,
        limit: u32,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { entity, key } => DomainError::already_exists(entity, key),
            StoreError::DuplicateAssignment {
                license_key,
                device_id,
            } => DomainError::DuplicateAssignment {
                license_key,
                device_id,
            },
            StoreError::CapacityExceeded {
                license_key,
                current,
                limit,
            } => DomainError::CapacityExceeded {
                license_key,
                current,
                limit,
            },
            StoreError::Unavailable(msg) => DomainError::Store(msg),
        }
    }
}

/// Filter criteria for assignment lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFilter {
    pub license_key: Option<LicenseKey>,
    pub device_id: Option<DeviceId>,
}

impl AssignmentFilter {
    pub fn by_license(key: LicenseKey) -> Self {
        Self {
            license_key: Some(key),
            ..Default::default()
        }
    }

    pub fn by_device(id: DeviceId) -> Self {
        Self {
            device_id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_pair(key: LicenseKey, id: DeviceId) -> Self {
        Self {
            license_key: Some(key),
            device_id: Some(id),
        }
    }

    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.license_key
            .as_ref()
            .is_none_or(|k| *k == assignment.license_key)
            && self
                .device_id
                .as_ref()
                .is_none_or(|d| *d == assignment.device_id)
    }
}

/// Filter criteria for license listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFilter {
    pub vendor_id: Option<VendorId>,
    /// Case-insensitive substring match on the software name.
    pub software_name: Option<String>,
    /// Only licenses already expired as of this date.
    pub expired_as_of: Option<NaiveDate>,
}

impl LicenseFilter {
    pub fn matches(&self, license: &License) -> bool {
        self.vendor_id.is_none_or(|v| v == license.vendor_id)
            && self.software_name.as_ref().is_none_or(|needle| {
                license
                    .software_name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
            && self.expired_as_of.is_none_or(|today| license.is_expired(today))
    }
}

/// Filter criteria for device listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    pub status: Option<DeviceStatus>,
    /// Case-insensitive substring match on the location.
    pub location: Option<String>,
    /// Case-insensitive substring match on the device type.
    pub device_type: Option<String>,
}

impl DeviceFilter {
    pub fn by_status(status: DeviceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, device: &Device) -> bool {
        self.status.is_none_or(|s| s == device.status)
            && self.location.as_ref().is_none_or(|needle| {
                device.location.to_lowercase().contains(&needle.to_lowercase())
            })
            && self.device_type.as_ref().is_none_or(|needle| {
                device
                    .device_type
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

/// Durable storage for the tracked entities.
pub trait EntityStore: Send + Sync {
    // --- licenses ---

    /// Insert a license; `DuplicateKey` if the key is taken.
    fn insert_license(&self, license: License) -> Result<(), StoreError>;
    fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError>;
    /// Stable order: ascending license key.
    fn list_licenses(&self, filter: &LicenseFilter) -> Result<Vec<License>, StoreError>;
    /// Replace an existing license; `false` if the key is unknown.
    fn update_license(&self, license: License) -> Result<bool, StoreError>;
    /// Delete a license, cascading its assignments; `false` if unknown.
    fn delete_license(&self, key: &LicenseKey) -> Result<bool, StoreError>;

    // --- devices ---

    fn insert_device(&self, device: Device) -> Result<(), StoreError>;
    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError>;
    /// Stable order: ascending device id.
    fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError>;
    fn update_device(&self, device: Device) -> Result<bool, StoreError>;
    /// Delete a device, cascading its assignments and software versions.
    fn delete_device(&self, id: &DeviceId) -> Result<bool, StoreError>;

    // --- vendors ---

    fn insert_vendor(&self, vendor: Vendor) -> Result<(), StoreError>;
    fn get_vendor(&self, id: &VendorId) -> Result<Option<Vendor>, StoreError>;
    /// Stable order: ascending vendor name, then id.
    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError>;
    fn delete_vendor(&self, id: &VendorId) -> Result<bool, StoreError>;

    // --- assignments ---

    /// Conditional insert: fails with `DuplicateAssignment` if the
    /// (license, device) pair is already live, or `CapacityExceeded` if the
    /// license already carries `capacity` live assignments. The check and
    /// the insert are atomic — this is the primitive that keeps the capacity
    /// invariant under concurrency.
    fn insert_assignment(&self, assignment: Assignment, capacity: u32) -> Result<(), StoreError>;
    /// Delete and return the removed row; `None` if unknown.
    fn delete_assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError>;
    /// Stable order: insertion order (ascending `assigned_at`).
    fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError>;
    fn count_assignments(&self, filter: &AssignmentFilter) -> Result<u32, StoreError>;

    // --- software versions ---

    fn insert_software_version(&self, version: SoftwareVersion) -> Result<(), StoreError>;
    fn get_software_version(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<Option<SoftwareVersion>, StoreError>;
    /// All versions, or only those of one device.
    fn list_software_versions(
        &self,
        device_id: Option<&DeviceId>,
    ) -> Result<Vec<SoftwareVersion>, StoreError>;
    fn update_software_version(&self, version: SoftwareVersion) -> Result<bool, StoreError>;
    fn delete_software_version(&self, id: &SoftwareVersionId) -> Result<bool, StoreError>;

    // --- audit trail ---

    /// Append-only; rows are never updated or deleted through this contract.
    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError>;
    /// Most recent first.
    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError>;
}

impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    fn insert_license(&self, license: License) -> Result<(), StoreError> {
        (**self).insert_license(license)
    }

    fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        (**self).get_license(key)
    }

    fn list_licenses(&self, filter: &LicenseFilter) -> Result<Vec<License>, StoreError> {
        (**self).list_licenses(filter)
    }

    fn update_license(&self, license: License) -> Result<bool, StoreError> {
        (**self).update_license(license)
    }

    fn delete_license(&self, key: &LicenseKey) -> Result<bool, StoreError> {
        (**self).delete_license(key)
    }

    fn insert_device(&self, device: Device) -> Result<(), StoreError> {
        (**self).insert_device(device)
    }

    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        (**self).get_device(id)
    }

    fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError> {
        (**self).list_devices(filter)
    }

    fn update_device(&self, device: Device) -> Result<bool, StoreError> {
        (**self).update_device(device)
    }

    fn delete_device(&self, id: &DeviceId) -> Result<bool, StoreError> {
        (**self).delete_device(id)
    }

    fn insert_vendor(&self, vendor: Vendor) -> Result<(), StoreError> {
        (**self).insert_vendor(vendor)
    }

    fn get_vendor(&self, id: &VendorId) -> Result<Option<Vendor>, StoreError> {
        (**self).get_vendor(id)
    }

    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        (**self).list_vendors()
    }

    fn delete_vendor(&self, id: &VendorId) -> Result<bool, StoreError> {
        (**self).delete_vendor(id)
    }

    fn insert_assignment(&self, assignment: Assignment, capacity: u32) -> Result<(), StoreError> {
        (**self).insert_assignment(assignment, capacity)
    }

    fn delete_assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError> {
        (**self).delete_assignment(id)
    }

    fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError> {
        (**self).list_assignments(filter)
    }

    fn count_assignments(&self, filter: &AssignmentFilter) -> Result<u32, StoreError> {
        (**self).count_assignments(filter)
    }

    fn insert_software_version(&self, version: SoftwareVersion) -> Result<(), StoreError> {
        (**self).insert_software_version(version)
    }

    fn get_software_version(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<Option<SoftwareVersion>, StoreError> {
        (**self).get_software_version(id)
    }

    fn list_software_versions(
        &self,
        device_id: Option<&DeviceId>,
    ) -> Result<Vec<SoftwareVersion>, StoreError> {
        (**self).list_software_versions(device_id)
    }

    fn update_software_version(&self, version: SoftwareVersion) -> Result<bool, StoreError> {
        (**self).update_software_version(version)
    }

    fn delete_software_version(&self, id: &SoftwareVersionId) -> Result<bool, StoreError> {
        (**self).delete_software_version(id)
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        (**self).append_audit(entry)
    }

    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        (**self).list_audit(limit)
    }
}
