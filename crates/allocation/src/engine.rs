use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licwarden_audit::{AuditAction, AuditEntry, AuditSink};
use licwarden_core::{
    AssignmentId, DeviceId, DomainError, DomainResult, EntityKind, LicenseKey, UserId,
};
use licwarden_licenses::Assignment;
use licwarden_store::{AssignmentFilter, EntityStore, LicenseFilter};

use crate::report::UtilizationReport;

/// Command: assign a license to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignLicense {
    pub license_key: LicenseKey,
    pub device_id: DeviceId,
    pub assigned_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: release an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAssignment {
    pub assignment_id: AssignmentId,
    pub released_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of a release: which binding was dissolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Released {
    pub assignment_id: AssignmentId,
    pub license_key: LicenseKey,
    pub device_id: DeviceId,
}

/// License allocation engine.
///
/// Write path for assignments plus the utilization read side. Precondition
/// failures are checked in a fixed order (license, device, pair, capacity) so
/// the first violation wins; the store's conditional insert then re-checks
/// pair and capacity atomically, which is what holds the invariants when two
/// requests race on the same license.
#[derive(Debug)]
pub struct AllocationEngine<S, A> {
    store: S,
    audit: A,
}

impl<S, A> AllocationEngine<S, A>
where
    S: EntityStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    pub fn assign(&self, cmd: AssignLicense) -> DomainResult<Assignment> {
        let license = self
            .store
            .get_license(&cmd.license_key)?
            .ok_or_else(|| DomainError::not_found(EntityKind::License, cmd.license_key.as_str()))?;

        self.store
            .get_device(&cmd.device_id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Device, cmd.device_id.as_str()))?;

        let pair = AssignmentFilter::by_pair(cmd.license_key.clone(), cmd.device_id.clone());
        if self.store.count_assignments(&pair)? > 0 {
            return Err(DomainError::DuplicateAssignment {
                license_key: cmd.license_key.to_string(),
                device_id: cmd.device_id.to_string(),
            });
        }

        let current = self
            .store
            .count_assignments(&AssignmentFilter::by_license(cmd.license_key.clone()))?;
        if current >= license.max_usage {
            return Err(DomainError::CapacityExceeded {
                license_key: cmd.license_key.to_string(),
                current,
                limit: license.max_usage,
            });
        }

        let assignment = Assignment {
            id: AssignmentId::new(),
            license_key: cmd.license_key,
            device_id: cmd.device_id,
            assigned_by: cmd.assigned_by,
            assigned_at: cmd.occurred_at,
        };
        self.store
            .insert_assignment(assignment.clone(), license.max_usage)?;

        self.record_audit(AuditEntry::new(
            cmd.assigned_by,
            EntityKind::Assignment,
            assignment.id.to_string(),
            AuditAction::Assign,
            Some(format!(
                "Assigned license {} to device {}",
                assignment.license_key, assignment.device_id
            )),
            cmd.occurred_at,
        ));

        Ok(assignment)
    }

    pub fn release(&self, cmd: ReleaseAssignment) -> DomainResult<Released> {
        // Read-then-delete is one store call; the removed row tells the
        // caller (and the audit trail) which binding went away.
        let removed = self
            .store
            .delete_assignment(&cmd.assignment_id)?
            .ok_or_else(|| {
                DomainError::not_found(EntityKind::Assignment, cmd.assignment_id.to_string())
            })?;

        self.record_audit(AuditEntry::new(
            cmd.released_by,
            EntityKind::Assignment,
            removed.id.to_string(),
            AuditAction::Release,
            Some(format!(
                "Released license {} from device {}",
                removed.license_key, removed.device_id
            )),
            cmd.occurred_at,
        ));

        Ok(Released {
            assignment_id: removed.id,
            license_key: removed.license_key,
            device_id: removed.device_id,
        })
    }

    pub fn utilization(&self, license_key: &LicenseKey) -> DomainResult<UtilizationReport> {
        let license = self
            .store
            .get_license(license_key)?
            .ok_or_else(|| DomainError::not_found(EntityKind::License, license_key.as_str()))?;
        let current = self
            .store
            .count_assignments(&AssignmentFilter::by_license(license_key.clone()))?;
        Ok(UtilizationReport::for_license(&license, current))
    }

    /// Utilization of every stored license, ascending by key.
    pub fn utilization_overview(&self) -> DomainResult<Vec<UtilizationReport>> {
        let licenses = self.store.list_licenses(&LicenseFilter::default())?;
        licenses
            .iter()
            .map(|license| {
                let current = self
                    .store
                    .count_assignments(&AssignmentFilter::by_license(license.key.clone()))?;
                Ok(UtilizationReport::for_license(license, current))
            })
            .collect()
    }

    pub fn assignments_for_device(&self, device_id: &DeviceId) -> DomainResult<Vec<Assignment>> {
        let mut out = self
            .store
            .list_assignments(&AssignmentFilter::by_device(device_id.clone()))?;
        sort_stable(&mut out);
        Ok(out)
    }

    pub fn assignments_for_license(
        &self,
        license_key: &LicenseKey,
    ) -> DomainResult<Vec<Assignment>> {
        let mut out = self
            .store
            .list_assignments(&AssignmentFilter::by_license(license_key.clone()))?;
        sort_stable(&mut out);
        Ok(out)
    }

    /// Best-effort: audit must never block or fail the business operation.
    fn record_audit(&self, entry: AuditEntry) {
        if let Err(err) = self.audit.record(entry) {
            tracing::warn!(error = %err, "audit write failed, continuing");
        }
    }
}

fn sort_stable(assignments: &mut [Assignment]) {
    assignments.sort_by(|a, b| {
        a.assigned_at
            .cmp(&b.assigned_at)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    use licwarden_audit::{AuditError, InMemoryAuditSink, NullAuditSink};
    use licwarden_core::VendorId;
    use licwarden_devices::NewDevice;
    use licwarden_licenses::{LicenseKind, NewLicense};
    use licwarden_store::InMemoryEntityStore;

    use crate::report::UtilizationStatus;

    type TestEngine = AllocationEngine<Arc<InMemoryEntityStore>, Arc<InMemoryAuditSink>>;

    fn engine() -> (TestEngine, Arc<InMemoryEntityStore>, Arc<InMemoryAuditSink>) {
        let store = Arc::new(InMemoryEntityStore::new());
        let sink = Arc::new(InMemoryAuditSink::new());
        (
            AllocationEngine::new(Arc::clone(&store), Arc::clone(&sink)),
            store,
            sink,
        )
    }

    fn seed_license(store: &InMemoryEntityStore, key: &str, max_usage: u32) {
        let license = NewLicense {
            key: LicenseKey::from(key),
            software_name: "Network Analyzer".to_string(),
            vendor_id: VendorId::new(),
            valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            kind: LicenseKind::PerDevice,
            max_usage,
            notes: None,
            occurred_at: Utc::now(),
        }
        .build()
        .unwrap();
        store.insert_license(license).unwrap();
    }

    fn seed_device(store: &InMemoryEntityStore, id: &str) {
        let device = NewDevice {
            id: DeviceId::from(id),
            device_type: "Router".to_string(),
            ip_address: "10.1.0.1".to_string(),
            location: "DC-1".to_string(),
            model: None,
            status: None,
            occurred_at: Utc::now(),
        }
        .build()
        .unwrap();
        store.insert_device(device).unwrap();
    }

    fn assign_cmd(key: &str, dev: &str) -> AssignLicense {
        AssignLicense {
            license_key: LicenseKey::from(key),
            device_id: DeviceId::from(dev),
            assigned_by: UserId::new(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn assign_checks_preconditions_in_order() {
        let (engine, store, _) = engine();

        // No license yet: license wins over the (also missing) device.
        let err = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap_err();
        assert_eq!(
            err,
            DomainError::not_found(EntityKind::License, "LIC-1")
        );

        seed_license(&store, "LIC-1", 2);
        let err = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap_err();
        assert_eq!(err, DomainError::not_found(EntityKind::Device, "DEV-A"));
    }

    #[test]
    fn capacity_limit_is_enforced_with_counts_in_message() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 2);
        for dev in ["DEV-A", "DEV-B", "DEV-C"] {
            seed_device(&store, dev);
        }

        engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();
        engine.assign(assign_cmd("LIC-1", "DEV-B")).unwrap();

        let err = engine.assign(assign_cmd("LIC-1", "DEV-C")).unwrap_err();
        assert_eq!(
            err,
            DomainError::CapacityExceeded {
                license_key: "LIC-1".to_string(),
                current: 2,
                limit: 2,
            }
        );
        assert!(err.to_string().contains("2/2"));
    }

    #[test]
    fn reassigning_the_same_pair_is_a_duplicate() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 5);
        seed_device(&store, "DEV-A");

        engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();
        let err = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateAssignment {
                license_key: "LIC-1".to_string(),
                device_id: "DEV-A".to_string(),
            }
        );
    }

    #[test]
    fn release_unknown_assignment_leaves_state_unchanged() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 2);
        seed_device(&store, "DEV-A");
        engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();

        let err = engine
            .release(ReleaseAssignment {
                assignment_id: AssignmentId::new(),
                released_by: UserId::new(),
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(
            engine.utilization(&LicenseKey::from("LIC-1")).unwrap().current_usage,
            1
        );
    }

    #[test]
    fn release_reports_the_dissolved_binding() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 2);
        seed_device(&store, "DEV-A");
        let assignment = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();

        let released = engine
            .release(ReleaseAssignment {
                assignment_id: assignment.id,
                released_by: UserId::new(),
                occurred_at: Utc::now(),
            })
            .unwrap();
        assert_eq!(released.license_key, LicenseKey::from("LIC-1"));
        assert_eq!(released.device_id, DeviceId::from("DEV-A"));
    }

    #[test]
    fn utilization_tracks_assign_and_release_one_for_one() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 10);
        let key = LicenseKey::from("LIC-1");

        let mut ids = Vec::new();
        for i in 0..4 {
            let dev = format!("DEV-{i}");
            seed_device(&store, &dev);
            ids.push(engine.assign(assign_cmd("LIC-1", &dev)).unwrap().id);
        }
        assert_eq!(engine.utilization(&key).unwrap().current_usage, 4);

        for id in ids.drain(..2) {
            engine
                .release(ReleaseAssignment {
                    assignment_id: id,
                    released_by: UserId::new(),
                    occurred_at: Utc::now(),
                })
                .unwrap();
        }
        let report = engine.utilization(&key).unwrap();
        assert_eq!(report.current_usage, 2);
        assert_eq!(report.available, 8);
        assert_eq!(report.utilization_percent, 20.0);
        assert_eq!(report.status, UtilizationStatus::Ok);
    }

    #[test]
    fn utilization_at_80_percent_warns() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 5);
        for i in 0..4 {
            let dev = format!("DEV-{i}");
            seed_device(&store, &dev);
            engine.assign(assign_cmd("LIC-1", &dev)).unwrap();
        }

        let report = engine.utilization(&LicenseKey::from("LIC-1")).unwrap();
        assert_eq!(report.utilization_percent, 80.0);
        assert_eq!(report.status, UtilizationStatus::Warning);
        assert_eq!(report.available, 1);
    }

    #[test]
    fn capacity_invariant_holds_under_concurrent_assigns() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 3);
        for i in 0..12 {
            seed_device(&store, &format!("DEV-{i}"));
        }

        let engine = Arc::new(engine);
        let handles: Vec<_> = (0..12)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.assign(assign_cmd("LIC-1", &format!("DEV-{i}"))))
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join())
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(successes, 3);
        assert_eq!(
            engine.utilization(&LicenseKey::from("LIC-1")).unwrap().current_usage,
            3
        );
    }

    #[test]
    fn successful_mutations_are_audited() {
        let (engine, store, sink) = engine();
        seed_license(&store, "LIC-1", 2);
        seed_device(&store, "DEV-A");

        let assignment = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();
        engine
            .release(ReleaseAssignment {
                assignment_id: assignment.id,
                released_by: UserId::new(),
                occurred_at: Utc::now(),
            })
            .unwrap();

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Assign);
        assert_eq!(entries[1].action, AuditAction::Release);
        assert!(entries[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("LIC-1"));
    }

    #[test]
    fn failed_assign_is_not_audited() {
        let (engine, store, sink) = engine();
        seed_license(&store, "LIC-1", 1);
        seed_device(&store, "DEV-A");

        engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();
        let _ = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap_err();
        assert_eq!(sink.entries().len(), 1);
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
            Err(AuditError("sink down".to_string()))
        }
    }

    #[test]
    fn audit_failure_does_not_fail_the_command() {
        // Accepted weak-consistency point: the business write stands even
        // when the trail write fails.
        let store = Arc::new(InMemoryEntityStore::new());
        seed_license(&store, "LIC-1", 2);
        seed_device(&store, "DEV-A");
        let engine = AllocationEngine::new(Arc::clone(&store), FailingSink);

        let assignment = engine.assign(assign_cmd("LIC-1", "DEV-A")).unwrap();
        assert_eq!(assignment.license_key, LicenseKey::from("LIC-1"));
    }

    #[test]
    fn assignment_lists_are_stably_ordered() {
        let (engine, store, _) = engine();
        seed_license(&store, "LIC-1", 10);
        seed_device(&store, "DEV-A");
        seed_license(&store, "LIC-2", 10);
        seed_license(&store, "LIC-3", 10);

        for key in ["LIC-1", "LIC-2", "LIC-3"] {
            engine.assign(assign_cmd(key, "DEV-A")).unwrap();
        }

        let listed = engine
            .assignments_for_device(&DeviceId::from("DEV-A"))
            .unwrap();
        let mut sorted = listed.clone();
        sort_stable(&mut sorted);
        assert_eq!(listed, sorted);
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn utilization_overview_covers_every_license() {
        let store = Arc::new(InMemoryEntityStore::new());
        seed_license(&store, "LIC-B", 4);
        seed_license(&store, "LIC-A", 2);
        let engine = AllocationEngine::new(Arc::clone(&store), NullAuditSink);

        let overview = engine.utilization_overview().unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].license_key, LicenseKey::from("LIC-A"));
        assert_eq!(overview[1].license_key, LicenseKey::from("LIC-B"));
    }
}
