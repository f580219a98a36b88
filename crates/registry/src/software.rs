use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licwarden_audit::{AuditAction, AuditEntry, AuditSink};
use licwarden_core::{DeviceId, DomainError, DomainResult, EntityKind, SoftwareVersionId, UserId};
use licwarden_devices::{
    NewSoftwareVersion, SoftwareVersion, SoftwareVersionUpdate, VersionStatus,
};
use licwarden_store::EntityStore;

/// Fleet-wide patch posture: how many installations need attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStatusSummary {
    pub outdated: u32,
    pub critical: u32,
    /// Installations needing attention (outdated + critical).
    pub total: u32,
}

/// Software-version registry: per-device version sightings.
#[derive(Debug)]
pub struct SoftwareVersionRegistry<S, A> {
    store: S,
    audit: A,
}

impl<S, A> SoftwareVersionRegistry<S, A>
where
    S: EntityStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn record(
        &self,
        cmd: NewSoftwareVersion,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<SoftwareVersion> {
        if self.store.get_device(&cmd.device_id)?.is_none() {
            return Err(DomainError::not_found(
                EntityKind::Device,
                cmd.device_id.as_str(),
            ));
        }

        let version = cmd.build()?;
        self.store.insert_software_version(version.clone())?;

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::SoftwareVersion,
            version.id.to_string(),
            AuditAction::Create,
            Some(format!(
                "Recorded {} {} on device {}",
                version.software_name, version.current_version, version.device_id
            )),
            occurred_at,
        ));
        Ok(version)
    }

    pub fn list_for_device(&self, device_id: &DeviceId) -> DomainResult<Vec<SoftwareVersion>> {
        if self.store.get_device(device_id)?.is_none() {
            return Err(DomainError::not_found(
                EntityKind::Device,
                device_id.as_str(),
            ));
        }
        Ok(self.store.list_software_versions(Some(device_id))?)
    }

    pub fn list_all(&self) -> DomainResult<Vec<SoftwareVersion>> {
        Ok(self.store.list_software_versions(None)?)
    }

    pub fn update(
        &self,
        id: &SoftwareVersionId,
        update: SoftwareVersionUpdate,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<SoftwareVersion> {
        let existing = self
            .store
            .get_software_version(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::SoftwareVersion, id.to_string()))?;

        let updated = existing.apply_update(update)?;
        if !self.store.update_software_version(updated.clone())? {
            return Err(DomainError::not_found(
                EntityKind::SoftwareVersion,
                id.to_string(),
            ));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::SoftwareVersion,
            updated.id.to_string(),
            AuditAction::Update,
            Some(format!(
                "Updated {} on device {}",
                updated.software_name, updated.device_id
            )),
            occurred_at,
        ));
        Ok(updated)
    }

    pub fn delete(
        &self,
        id: &SoftwareVersionId,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.store.delete_software_version(id)? {
            return Err(DomainError::not_found(
                EntityKind::SoftwareVersion,
                id.to_string(),
            ));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::SoftwareVersion,
            id.to_string(),
            AuditAction::Delete,
            Some(format!("Deleted software version {id}")),
            occurred_at,
        ));
        Ok(())
    }

    pub fn status_summary(&self) -> DomainResult<VersionStatusSummary> {
        let versions = self.store.list_software_versions(None)?;
        let outdated = versions
            .iter()
            .filter(|v| v.status == VersionStatus::Outdated)
            .count() as u32;
        let critical = versions
            .iter()
            .filter(|v| v.status == VersionStatus::Critical)
            .count() as u32;
        Ok(VersionStatusSummary {
            outdated,
            critical,
            total: outdated + critical,
        })
    }

    fn record_audit(&self, entry: AuditEntry) {
        if let Err(err) = self.audit.record(entry) {
            tracing::warn!(error = %err, "audit write failed, continuing");
        }
    }
}
