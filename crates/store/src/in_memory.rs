use std::collections::HashMap;
use std::sync::RwLock;

use licwarden_audit::AuditEntry;
use licwarden_core::{AssignmentId, DeviceId, LicenseKey, SoftwareVersionId, VendorId, EntityKind};
use licwarden_devices::{Device, SoftwareVersion};
use licwarden_licenses::{Assignment, License, Vendor};

use crate::contract::{AssignmentFilter, DeviceFilter, EntityStore, LicenseFilter, StoreError};

#[derive(Debug, Default)]
struct Inner {
    licenses: HashMap<LicenseKey, License>,
    devices: HashMap<DeviceId, Device>,
    vendors: HashMap<VendorId, Vendor>,
    // Insertion-ordered; this is the stable order exposed by list_assignments.
    assignments: Vec<Assignment>,
    software_versions: Vec<SoftwareVersion>,
    audit_log: Vec<AuditEntry>,
}

/// In-memory entity store.
///
/// Intended for tests/dev. Not optimized for performance; the write lock is
/// held across the whole of each mutating call, which is exactly what makes
/// the conditional assignment insert atomic.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: RwLock<Inner>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl EntityStore for InMemoryEntityStore {
    fn insert_license(&self, license: License) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.licenses.contains_key(&license.key) {
            return Err(StoreError::DuplicateKey {
                entity: EntityKind::License,
                key: license.key.to_string(),
            });
        }
        inner.licenses.insert(license.key.clone(), license);
        Ok(())
    }

    fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        Ok(self.read()?.licenses.get(key).cloned())
    }

    fn list_licenses(&self, filter: &LicenseFilter) -> Result<Vec<License>, StoreError> {
        let inner = self.read()?;
        let mut out: Vec<License> = inner
            .licenses
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    fn update_license(&self, license: License) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        match inner.licenses.get_mut(&license.key) {
            Some(slot) => {
                *slot = license;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_license(&self, key: &LicenseKey) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if inner.licenses.remove(key).is_none() {
            return Ok(false);
        }
        inner.assignments.retain(|a| a.license_key != *key);
        Ok(true)
    }

    fn insert_device(&self, device: Device) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.devices.contains_key(&device.id) {
            return Err(StoreError::DuplicateKey {
                entity: EntityKind::Device,
                key: device.id.to_string(),
            });
        }
        inner.devices.insert(device.id.clone(), device);
        Ok(())
    }

    fn get_device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        Ok(self.read()?.devices.get(id).cloned())
    }

    fn list_devices(&self, filter: &DeviceFilter) -> Result<Vec<Device>, StoreError> {
        let inner = self.read()?;
        let mut out: Vec<Device> = inner
            .devices
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn update_device(&self, device: Device) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        match inner.devices.get_mut(&device.id) {
            Some(slot) => {
                *slot = device;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_device(&self, id: &DeviceId) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if inner.devices.remove(id).is_none() {
            return Ok(false);
        }
        inner.assignments.retain(|a| a.device_id != *id);
        inner.software_versions.retain(|v| v.device_id != *id);
        Ok(true)
    }

    fn insert_vendor(&self, vendor: Vendor) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.vendors.contains_key(&vendor.id) {
            return Err(StoreError::DuplicateKey {
                entity: EntityKind::Vendor,
                key: vendor.id.to_string(),
            });
        }
        inner.vendors.insert(vendor.id, vendor);
        Ok(())
    }

    fn get_vendor(&self, id: &VendorId) -> Result<Option<Vendor>, StoreError> {
        Ok(self.read()?.vendors.get(id).cloned())
    }

    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        let inner = self.read()?;
        let mut out: Vec<Vendor> = inner.vendors.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())));
        Ok(out)
    }

    fn delete_vendor(&self, id: &VendorId) -> Result<bool, StoreError> {
        Ok(self.write()?.vendors.remove(id).is_some())
    }

    fn insert_assignment(&self, assignment: Assignment, capacity: u32) -> Result<(), StoreError> {
        // Single write lock across duplicate check, capacity count and push:
        // concurrent racers serialize here and the loser sees the winner's row.
        let mut inner = self.write()?;

        let duplicate = inner.assignments.iter().any(|a| {
            a.license_key == assignment.license_key && a.device_id == assignment.device_id
        });
        if duplicate {
            return Err(StoreError::DuplicateAssignment {
                license_key: assignment.license_key.to_string(),
                device_id: assignment.device_id.to_string(),
            });
        }

        let current = inner
            .assignments
            .iter()
            .filter(|a| a.license_key == assignment.license_key)
            .count() as u32;
        if current >= capacity {
            return Err(StoreError::CapacityExceeded {
                license_key: assignment.license_key.to_string(),
                current,
                limit: capacity,
            });
        }

        inner.assignments.push(assignment);
        Ok(())
    }

    fn delete_assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError> {
        let mut inner = self.write()?;
        match inner.assignments.iter().position(|a| a.id == *id) {
            Some(idx) => Ok(Some(inner.assignments.remove(idx))),
            None => Ok(None),
        }
    }

    fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .assignments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    fn count_assignments(&self, filter: &AssignmentFilter) -> Result<u32, StoreError> {
        let inner = self.read()?;
        Ok(inner.assignments.iter().filter(|a| filter.matches(a)).count() as u32)
    }

    fn insert_software_version(&self, version: SoftwareVersion) -> Result<(), StoreError> {
        self.write()?.software_versions.push(version);
        Ok(())
    }

    fn get_software_version(
        &self,
        id: &SoftwareVersionId,
    ) -> Result<Option<SoftwareVersion>, StoreError> {
        Ok(self
            .read()?
            .software_versions
            .iter()
            .find(|v| v.id == *id)
            .cloned())
    }

    fn list_software_versions(
        &self,
        device_id: Option<&DeviceId>,
    ) -> Result<Vec<SoftwareVersion>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .software_versions
            .iter()
            .filter(|v| device_id.is_none_or(|d| v.device_id == *d))
            .cloned()
            .collect())
    }

    fn update_software_version(&self, version: SoftwareVersion) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        match inner.software_versions.iter_mut().find(|v| v.id == version.id) {
            Some(slot) => {
                *slot = version;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_software_version(&self, id: &SoftwareVersionId) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let before = inner.software_versions.len();
        inner.software_versions.retain(|v| v.id != *id);
        Ok(inner.software_versions.len() < before)
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.write()?.audit_log.push(entry);
        Ok(())
    }

    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, StoreError> {
        let inner = self.read()?;
        Ok(inner.audit_log.iter().rev().take(limit).cloned().collect())
    }
}
