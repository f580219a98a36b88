use chrono::{DateTime, Utc};

use licwarden_audit::{AuditAction, AuditEntry, AuditSink};
use licwarden_core::{DomainError, DomainResult, EntityKind, LicenseKey, UserId};
use licwarden_licenses::{License, LicenseUpdate, NewLicense};
use licwarden_store::{EntityStore, LicenseFilter};

/// License registry: create, read, update, delete with reference checks.
#[derive(Debug)]
pub struct LicenseRegistry<S, A> {
    store: S,
    audit: A,
}

impl<S, A> LicenseRegistry<S, A>
where
    S: EntityStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn create(&self, cmd: NewLicense, actor: UserId) -> DomainResult<License> {
        if self.store.get_license(&cmd.key)?.is_some() {
            return Err(DomainError::already_exists(
                EntityKind::License,
                cmd.key.as_str(),
            ));
        }
        if self.store.get_vendor(&cmd.vendor_id)?.is_none() {
            return Err(DomainError::not_found(
                EntityKind::Vendor,
                cmd.vendor_id.to_string(),
            ));
        }

        let license = cmd.build()?;
        self.store.insert_license(license.clone())?;

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::License,
            license.key.to_string(),
            AuditAction::Create,
            Some(format!(
                "Created license {} ({})",
                license.key, license.software_name
            )),
            license.created_at,
        ));
        Ok(license)
    }

    pub fn get(&self, key: &LicenseKey) -> DomainResult<License> {
        self.store
            .get_license(key)?
            .ok_or_else(|| DomainError::not_found(EntityKind::License, key.as_str()))
    }

    pub fn list(&self, filter: &LicenseFilter) -> DomainResult<Vec<License>> {
        Ok(self.store.list_licenses(filter)?)
    }

    /// Vendor reassignment is revalidated against the vendor registry; the
    /// merged record is revalidated as a whole (window, capacity).
    pub fn update(
        &self,
        key: &LicenseKey,
        update: LicenseUpdate,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<License> {
        let existing = self.get(key)?;

        if let Some(vendor_id) = update.vendor_id {
            if self.store.get_vendor(&vendor_id)?.is_none() {
                return Err(DomainError::not_found(
                    EntityKind::Vendor,
                    vendor_id.to_string(),
                ));
            }
        }

        let updated = existing.apply_update(update)?;
        if !self.store.update_license(updated.clone())? {
            return Err(DomainError::not_found(EntityKind::License, key.as_str()));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::License,
            updated.key.to_string(),
            AuditAction::Update,
            Some(format!("Updated license {}", updated.key)),
            occurred_at,
        ));
        Ok(updated)
    }

    /// Deletion cascades: the store removes the license's assignments.
    pub fn delete(
        &self,
        key: &LicenseKey,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.store.delete_license(key)? {
            return Err(DomainError::not_found(EntityKind::License, key.as_str()));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::License,
            key.to_string(),
            AuditAction::Delete,
            Some(format!("Deleted license {key}")),
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
