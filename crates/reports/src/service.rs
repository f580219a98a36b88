use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;

use licwarden_core::DomainResult;
use licwarden_devices::DeviceStatus;
use licwarden_licenses::License;
use licwarden_risk::{
    devices_at_risk, expiring_licenses, overused_licenses, CapacityAlert, DeviceRiskReport,
    DeviceRiskSeverity, ExpiryAlert, ExpirySeverity, LicenseUsage, UsageSeverity,
};
use licwarden_store::{AssignmentFilter, DeviceFilter, EntityStore, LicenseFilter};

use crate::compliance::{ComplianceReport, ComplianceSummary, LicenseComplianceRow};
use crate::dashboard::DashboardSummary;
use crate::inventory::{
    DeviceInventoryReport, DeviceInventoryRow, VendorAnalysisReport, VendorAnalysisRow,
};

/// Read-side aggregation over the entity store.
///
/// Composes the allocation counts with the risk scorer into fleet-wide
/// snapshots. Holds no state; every call re-reads the store.
#[derive(Debug)]
pub struct ReportService<S> {
    store: S,
}

impl<S> ReportService<S>
where
    S: EntityStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn licenses_with_usage(&self) -> DomainResult<Vec<LicenseUsage>> {
        let licenses = self.store.list_licenses(&LicenseFilter::default())?;
        licenses
            .into_iter()
            .map(|license| {
                let assigned = self
                    .store
                    .count_assignments(&AssignmentFilter::by_license(license.key.clone()))?;
                Ok(LicenseUsage { license, assigned })
            })
            .collect()
    }

    /// Licenses expiring within `[today, today + window_days]`, most urgent
    /// first.
    pub fn expiring_licenses(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> DomainResult<Vec<ExpiryAlert>> {
        Ok(expiring_licenses(
            &self.licenses_with_usage()?,
            today,
            window_days,
        ))
    }

    /// Licenses at or above `threshold_percent` utilization, fullest first.
    pub fn overused_licenses(&self, threshold_percent: f64) -> DomainResult<Vec<CapacityAlert>> {
        Ok(overused_licenses(
            &self.licenses_with_usage()?,
            threshold_percent,
        ))
    }

    /// Active devices with expired or soon-expiring licenses.
    pub fn devices_at_risk(
        &self,
        today: NaiveDate,
        threshold_days: i64,
    ) -> DomainResult<Vec<DeviceRiskReport>> {
        let devices = self
            .store
            .list_devices(&DeviceFilter::by_status(DeviceStatus::Active))?;

        let mut fleet = Vec::with_capacity(devices.len());
        for device in devices {
            let assignments = self
                .store
                .list_assignments(&AssignmentFilter::by_device(device.id.clone()))?;
            let mut licenses: Vec<License> = Vec::with_capacity(assignments.len());
            for assignment in &assignments {
                if let Some(license) = self.store.get_license(&assignment.license_key)? {
                    licenses.push(license);
                }
            }
            fleet.push((device, licenses));
        }

        Ok(devices_at_risk(&fleet, today, threshold_days))
    }

    /// Fleet counters plus the cross-category critical alert count.
    pub fn dashboard_summary(&self, today: NaiveDate) -> DomainResult<DashboardSummary> {
        let expiring = self.expiring_licenses(today, 30)?;
        let overused = self.overused_licenses(75.0)?;
        let at_risk = self.devices_at_risk(today, 15)?;

        let devices = self.store.list_devices(&DeviceFilter::default())?;
        let count_status = |status: DeviceStatus| -> u32 {
            devices.iter().filter(|d| d.status == status).count() as u32
        };

        let licenses = self.store.list_licenses(&LicenseFilter::default())?;
        let expired_licenses = licenses.iter().filter(|l| l.is_expired(today)).count() as u32;

        let critical_alerts = expiring
            .iter()
            .filter(|a| a.severity == ExpirySeverity::Critical)
            .count()
            + overused
                .iter()
                .filter(|a| a.severity == UsageSeverity::Critical)
                .count()
            + at_risk
                .iter()
                .filter(|r| r.severity == DeviceRiskSeverity::Critical)
                .count();

        Ok(DashboardSummary {
            total_devices: devices.len() as u32,
            active_devices: count_status(DeviceStatus::Active),
            maintenance_devices: count_status(DeviceStatus::Maintenance),
            decommissioned_devices: count_status(DeviceStatus::Decommissioned),
            total_licenses: licenses.len() as u32,
            expired_licenses,
            expiring_licenses_count: expiring.len() as u32,
            overused_licenses_count: overused.len() as u32,
            devices_at_risk_count: at_risk.len() as u32,
            critical_alerts: critical_alerts as u32,
            generated_at: Utc::now(),
        })
    }

    /// License status distribution for audits.
    pub fn compliance_report(&self, today: NaiveDate) -> DomainResult<ComplianceReport> {
        let entries = self.licenses_with_usage()?;

        let mut valid = Vec::new();
        let mut expiring_30 = Vec::new();
        let mut expiring_60 = Vec::new();
        let mut expired = Vec::new();
        let mut overused = Vec::new();
        let mut underutilized = Vec::new();

        for entry in &entries {
            let row = LicenseComplianceRow::new(&entry.license, entry.assigned, today);

            // Exactly one expiry bucket per license.
            if row.days_until_expiry < 0 {
                expired.push(row.clone());
            } else if row.days_until_expiry <= 30 {
                expiring_30.push(row.clone());
            } else if row.days_until_expiry <= 60 {
                expiring_60.push(row.clone());
            } else {
                valid.push(row.clone());
            }

            // Usage flags are independent of the expiry bucket.
            if row.usage_percentage >= 90.0 {
                overused.push(row.clone());
            } else if row.usage_percentage < 30.0 {
                underutilized.push(row);
            }
        }

        let total = entries.len() as u32;
        let compliance_rate = if total == 0 {
            0.0
        } else {
            let raw = valid.len() as f64 / f64::from(total) * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Ok(ComplianceReport {
            report_date: Utc::now(),
            total_licenses: total,
            summary: ComplianceSummary {
                valid: valid.len() as u32,
                expiring_30_days: expiring_30.len() as u32,
                expiring_60_days: expiring_60.len() as u32,
                expired: expired.len() as u32,
                overused: overused.len() as u32,
                underutilized: underutilized.len() as u32,
            },
            valid_licenses: valid,
            expiring_30_days: expiring_30,
            expiring_60_days: expiring_60,
            expired_licenses: expired,
            overused_licenses: overused,
            underutilized_licenses: underutilized,
            compliance_rate,
        })
    }

    /// Fleet inventory with breakdowns and license coverage.
    pub fn device_inventory_report(&self) -> DomainResult<DeviceInventoryReport> {
        let devices = self.store.list_devices(&DeviceFilter::default())?;

        let mut status_breakdown: BTreeMap<String, u32> = BTreeMap::new();
        let mut location_breakdown: BTreeMap<String, u32> = BTreeMap::new();
        let mut type_breakdown: BTreeMap<String, u32> = BTreeMap::new();
        let mut with_licenses = Vec::new();
        let mut without_licenses = Vec::new();

        for device in &devices {
            *status_breakdown.entry(device.status.to_string()).or_default() += 1;
            *location_breakdown.entry(device.location.clone()).or_default() += 1;
            *type_breakdown.entry(device.device_type.clone()).or_default() += 1;

            let assigned = self
                .store
                .count_assignments(&AssignmentFilter::by_device(device.id.clone()))?;
            let row = DeviceInventoryRow {
                device_id: device.id.clone(),
                device_type: device.device_type.clone(),
                location: device.location.clone(),
                ip_address: device.ip_address.clone(),
                status: device.status.to_string(),
                model: device.model.clone(),
                assigned_licenses: assigned,
            };
            if assigned > 0 {
                with_licenses.push(row);
            } else {
                without_licenses.push(row);
            }
        }

        Ok(DeviceInventoryReport {
            report_date: Utc::now(),
            total_devices: devices.len() as u32,
            status_breakdown,
            location_breakdown,
            type_breakdown,
            devices_with_licenses: with_licenses,
            devices_without_licenses: without_licenses,
        })
    }

    /// License posture per vendor, largest portfolios first.
    pub fn vendor_analysis_report(&self, today: NaiveDate) -> DomainResult<VendorAnalysisReport> {
        let vendors = self.store.list_vendors()?;

        let mut rows = Vec::with_capacity(vendors.len());
        for vendor in &vendors {
            let licenses = self.store.list_licenses(&LicenseFilter {
                vendor_id: Some(vendor.id),
                ..Default::default()
            })?;

            let mut expired = 0u32;
            let mut expiring_soon = 0u32;
            let mut total_capacity = 0u64;
            let mut total_usage = 0u64;

            for license in &licenses {
                let days = license.days_until_expiry(today);
                if days < 0 {
                    expired += 1;
                } else if days <= 30 {
                    expiring_soon += 1;
                }
                total_capacity += u64::from(license.max_usage);
                total_usage += u64::from(
                    self.store
                        .count_assignments(&AssignmentFilter::by_license(license.key.clone()))?,
                );
            }

            let utilization_percentage = if total_capacity == 0 {
                0.0
            } else {
                let raw = total_usage as f64 / total_capacity as f64 * 100.0;
                (raw * 100.0).round() / 100.0
            };

            rows.push(VendorAnalysisRow {
                vendor_id: vendor.id,
                vendor_name: vendor.name.clone(),
                support_email: vendor.support_email.clone(),
                total_licenses: licenses.len() as u32,
                expired_licenses: expired,
                expiring_soon,
                total_capacity,
                total_usage,
                utilization_percentage,
            });
        }

        rows.sort_by(|a, b| {
            b.total_licenses
                .cmp(&a.total_licenses)
                .then_with(|| a.vendor_name.cmp(&b.vendor_name))
        });

        Ok(VendorAnalysisReport {
            report_date: Utc::now(),
            total_vendors: vendors.len() as u32,
            vendor_analysis: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    use licwarden_core::{AssignmentId, DeviceId, LicenseKey, UserId, VendorId};
    use licwarden_devices::{DeviceStatus, NewDevice};
    use licwarden_licenses::{Assignment, LicenseKind, NewLicense, NewVendor};
    use licwarden_store::InMemoryEntityStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    struct Fixture {
        store: Arc<InMemoryEntityStore>,
        service: ReportService<Arc<InMemoryEntityStore>>,
        vendor: VendorId,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryEntityStore::new());
            let vendor = VendorId::new();
            store
                .insert_vendor(
                    NewVendor {
                        id: vendor,
                        name: "NetSoft".to_string(),
                        support_email: None,
                        occurred_at: now(),
                    }
                    .build()
                    .unwrap(),
                )
                .unwrap();
            Self {
                service: ReportService::new(Arc::clone(&store)),
                store,
                vendor,
            }
        }

        fn license(&self, key: &str, expires_in_days: i64, max_usage: u32) {
            let license = NewLicense {
                key: LicenseKey::from(key),
                software_name: format!("{key} Suite"),
                vendor_id: self.vendor,
                valid_from: today() - chrono::Duration::days(365),
                valid_to: today() + chrono::Duration::days(expires_in_days),
                kind: LicenseKind::PerDevice,
                max_usage,
                notes: None,
                occurred_at: now(),
            }
            .build()
            .unwrap();
            self.store.insert_license(license).unwrap();
        }

        fn device(&self, id: &str, status: DeviceStatus) {
            let device = NewDevice {
                id: DeviceId::from(id),
                device_type: "Router".to_string(),
                ip_address: "10.2.0.1".to_string(),
                location: "DC-1".to_string(),
                model: None,
                status: Some(status),
                occurred_at: now(),
            }
            .build()
            .unwrap();
            self.store.insert_device(device).unwrap();
        }

        fn assign(&self, key: &str, dev: &str, capacity: u32) {
            self.store
                .insert_assignment(
                    Assignment {
                        id: AssignmentId::new(),
                        license_key: LicenseKey::from(key),
                        device_id: DeviceId::from(dev),
                        assigned_by: UserId::new(),
                        assigned_at: now(),
                    },
                    capacity,
                )
                .unwrap();
        }
    }

    #[test]
    fn compliance_buckets_are_total_and_disjoint() {
        let fx = Fixture::new();
        fx.license("LIC-EXPIRED", -5, 10);
        fx.license("LIC-30", 10, 10);
        fx.license("LIC-60", 45, 10);
        fx.license("LIC-VALID", 120, 10);

        let report = fx.service.compliance_report(today()).unwrap();
        assert_eq!(report.total_licenses, 4);
        let s = &report.summary;
        assert_eq!(
            (s.valid, s.expiring_30_days, s.expiring_60_days, s.expired),
            (1, 1, 1, 1)
        );
        assert_eq!(
            s.valid + s.expiring_30_days + s.expiring_60_days + s.expired,
            report.total_licenses
        );
        assert_eq!(report.compliance_rate, 25.0);
    }

    #[test]
    fn compliance_usage_flags_are_orthogonal_to_buckets() {
        let fx = Fixture::new();
        fx.device("DEV-A", DeviceStatus::Active);
        fx.device("DEV-B", DeviceStatus::Active);
        // Expiring within 30 days AND fully used.
        fx.license("LIC-HOT", 10, 2);
        fx.assign("LIC-HOT", "DEV-A", 2);
        fx.assign("LIC-HOT", "DEV-B", 2);
        // Valid and idle.
        fx.license("LIC-IDLE", 200, 10);

        let report = fx.service.compliance_report(today()).unwrap();
        assert_eq!(report.summary.expiring_30_days, 1);
        assert_eq!(report.summary.overused, 1);
        assert_eq!(report.summary.underutilized, 1);
        assert_eq!(report.overused_licenses[0].license_key, LicenseKey::from("LIC-HOT"));
    }

    #[test]
    fn compliance_rate_is_zero_for_empty_store() {
        let fx = Fixture::new();
        let report = fx.service.compliance_report(today()).unwrap();
        assert_eq!(report.total_licenses, 0);
        assert_eq!(report.compliance_rate, 0.0);
    }

    #[test]
    fn dashboard_counts_devices_licenses_and_critical_alerts() {
        let fx = Fixture::new();
        fx.device("DEV-A", DeviceStatus::Active);
        fx.device("DEV-B", DeviceStatus::Maintenance);
        fx.device("DEV-C", DeviceStatus::Decommissioned);
        fx.device("DEV-D", DeviceStatus::Obsolete);

        // Expires in 5 days -> CRITICAL expiry alert; also puts DEV-A at risk
        // (expiring soon only -> WARNING, not critical).
        fx.license("LIC-SOON", 5, 10);
        fx.assign("LIC-SOON", "DEV-A", 10);
        // 100% utilization -> CRITICAL capacity alert.
        fx.license("LIC-FULL", 200, 1);
        fx.assign("LIC-FULL", "DEV-A", 1);
        // Already expired -> expired counter + CRITICAL device risk for DEV-A.
        fx.license("LIC-DEAD", -3, 10);
        fx.assign("LIC-DEAD", "DEV-A", 10);

        let summary = fx.service.dashboard_summary(today()).unwrap();
        assert_eq!(summary.total_devices, 4);
        assert_eq!(summary.active_devices, 1);
        assert_eq!(summary.maintenance_devices, 1);
        assert_eq!(summary.decommissioned_devices, 1);
        assert_eq!(summary.total_licenses, 3);
        assert_eq!(summary.expired_licenses, 1);
        assert_eq!(summary.expiring_licenses_count, 1);
        assert_eq!(summary.overused_licenses_count, 1);
        assert_eq!(summary.devices_at_risk_count, 1);
        // CRITICAL expiry + CRITICAL capacity + CRITICAL device risk.
        assert_eq!(summary.critical_alerts, 3);
    }

    #[test]
    fn devices_at_risk_only_scans_active_devices() {
        let fx = Fixture::new();
        fx.device("DEV-LIVE", DeviceStatus::Active);
        fx.device("DEV-SHELVED", DeviceStatus::Decommissioned);
        fx.license("LIC-DEAD", -3, 10);
        fx.assign("LIC-DEAD", "DEV-LIVE", 10);
        fx.assign("LIC-DEAD", "DEV-SHELVED", 10);

        let at_risk = fx.service.devices_at_risk(today(), 15).unwrap();
        assert_eq!(at_risk.len(), 1);
        assert_eq!(at_risk[0].device_id, DeviceId::from("DEV-LIVE"));
    }

    #[test]
    fn device_inventory_breaks_down_and_splits_by_coverage() {
        let fx = Fixture::new();
        fx.device("DEV-A", DeviceStatus::Active);
        fx.device("DEV-B", DeviceStatus::Active);
        fx.license("LIC-1", 100, 5);
        fx.assign("LIC-1", "DEV-A", 5);

        let report = fx.service.device_inventory_report().unwrap();
        assert_eq!(report.total_devices, 2);
        assert_eq!(report.status_breakdown.get("ACTIVE"), Some(&2));
        assert_eq!(report.location_breakdown.get("DC-1"), Some(&2));
        assert_eq!(report.devices_with_licenses.len(), 1);
        assert_eq!(report.devices_without_licenses.len(), 1);
        assert_eq!(report.devices_with_licenses[0].assigned_licenses, 1);
    }

    #[test]
    fn vendor_analysis_aggregates_capacity_and_usage() {
        let fx = Fixture::new();
        fx.device("DEV-A", DeviceStatus::Active);
        fx.license("LIC-1", 10, 4);
        fx.license("LIC-2", -2, 6);
        fx.assign("LIC-1", "DEV-A", 4);

        let report = fx.service.vendor_analysis_report(today()).unwrap();
        assert_eq!(report.total_vendors, 1);
        let row = &report.vendor_analysis[0];
        assert_eq!(row.total_licenses, 2);
        assert_eq!(row.expired_licenses, 1);
        assert_eq!(row.expiring_soon, 1);
        assert_eq!(row.total_capacity, 10);
        assert_eq!(row.total_usage, 1);
        assert_eq!(row.utilization_percentage, 10.0);
    }
}
