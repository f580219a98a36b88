use chrono::{DateTime, Utc};

use licwarden_audit::{AuditAction, AuditEntry, AuditSink};
use licwarden_core::{DomainError, DomainResult, EntityKind, UserId, VendorId};
use licwarden_licenses::{NewVendor, Vendor};
use licwarden_store::{EntityStore, LicenseFilter};

/// Vendor registry.
#[derive(Debug)]
pub struct VendorRegistry<S, A> {
    store: S,
    audit: A,
}

impl<S, A> VendorRegistry<S, A>
where
    S: EntityStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn create(&self, cmd: NewVendor, actor: UserId) -> DomainResult<Vendor> {
        let vendor = cmd.build()?;
        self.store.insert_vendor(vendor.clone())?;

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::Vendor,
            vendor.id.to_string(),
            AuditAction::Create,
            Some(format!("Created vendor {}", vendor.name)),
            vendor.created_at,
        ));
        Ok(vendor)
    }

    pub fn get(&self, id: &VendorId) -> DomainResult<Vendor> {
        self.store
            .get_vendor(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Vendor, id.to_string()))
    }

    pub fn list(&self) -> DomainResult<Vec<Vendor>> {
        Ok(self.store.list_vendors()?)
    }

    /// A vendor cannot be removed while licenses still reference it; there
    /// is no cascade through the vendor relation.
    pub fn delete(
        &self,
        id: &VendorId,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let referencing = self.store.list_licenses(&LicenseFilter {
            vendor_id: Some(*id),
            ..Default::default()
        })?;
        if !referencing.is_empty() {
            return Err(DomainError::conflict(format!(
                "vendor {id} is still referenced by {} license(s)",
                referencing.len()
            )));
        }

        if !self.store.delete_vendor(id)? {
            return Err(DomainError::not_found(EntityKind::Vendor, id.to_string()));
        }

        self.record_audit(AuditEntry::new(
            actor,
            EntityKind::Vendor,
            id.to_string(),
            AuditAction::Delete,
            Some(format!("Deleted vendor {id}")),
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
