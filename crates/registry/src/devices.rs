use chrono::{DateTime, Utc};

use licwarden_audit::{AuditAction, AuditEntry, AuditSink};
use licwarden_core::{DeviceId, DomainError, DomainResult, EntityKind, UserId};
use licwarden_devices::{Device, DeviceUpdate, NewDevice};
use licwarden_store::{DeviceFilter, EntityStore};

/// Device registry: create, read, update, delete.
#[derive(Debug)]
pub struct DeviceRegistry<S, A> {
    store: S,
    audit: A,
}

impl<S, A> DeviceRegistry<S, A>
where
    S: EntityStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn create(&self, cmd: NewDevice, actor: UserId) -> DomainResult<Device> {
        if self.store.get_device(&cmd.id)?.is_some() {
            return Err(DomainError::already_exists(
                EntityKind::Device,
                cmd.id.as_str(),
            ));
        }

        let device = cmd.build()?;
        self.store.insert_device(device.clone())?;

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::Device,
            device.id.to_string(),
            AuditAction::Create,
            Some(format!(
                "Created device {} at {}",
                device.id, device.location
            )),
            device.created_at,
        ));
        Ok(device)
    }

    pub fn get(&self, id: &DeviceId) -> DomainResult<Device> {
        self.store
            .get_device(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Device, id.as_str()))
    }

    pub fn list(&self, filter: &DeviceFilter) -> DomainResult<Vec<Device>> {
        Ok(self.store.list_devices(filter)?)
    }

    pub fn update(
        &self,
        id: &DeviceId,
        update: DeviceUpdate,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Device> {
        let existing = self.get(id)?;
        let updated = existing.apply_update(update)?;
        if !self.store.update_device(updated.clone())? {
            return Err(DomainError::not_found(EntityKind::Device, id.as_str()));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::Device,
            updated.id.to_string(),
            AuditAction::Update,
            Some(format!("Updated device {}", updated.id)),
            occurred_at,
        ));
        Ok(updated)
    }

    /// Deletion cascades: assignments and software versions go with the
    /// device.
    pub fn delete(
        &self,
        id: &DeviceId,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.store.delete_device(id)? {
            return Err(DomainError::not_found(EntityKind::Device, id.as_str()));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::Device,
            id.to_string(),
            AuditAction::Delete,
            Some(format!("Deleted device {id}")),
            occurred_at,
        ));
        Ok(())
    }

    fn record_audit(&self, entry: AuditEntry) {
        if let Err(err) = self.audit.record(entry) {
            tracing::warn!(error = %err, "audit write failed, continuing");
        }
    }
}
