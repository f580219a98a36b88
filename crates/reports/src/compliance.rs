use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use licwarden_core::{LicenseKey, VendorId};
use licwarden_licenses::{License, LicenseKind};

/// One license as it appears in the compliance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseComplianceRow {
    pub license_key: LicenseKey,
    pub software_name: String,
    pub vendor_id: VendorId,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub days_until_expiry: i64,
    pub max_usage: u32,
    pub current_usage: u32,
    pub usage_percentage: f64,
    pub kind: LicenseKind,
}

impl LicenseComplianceRow {
    pub fn new(license: &License, current_usage: u32, today: NaiveDate) -> Self {
        Self {
            license_key: license.key.clone(),
            software_name: license.software_name.clone(),
            vendor_id: license.vendor_id,
            valid_from: license.validity.valid_from,
            valid_to: license.validity.valid_to,
            days_until_expiry: license.days_until_expiry(today),
            max_usage: license.max_usage,
            current_usage,
            usage_percentage: license.utilization_percent(current_usage),
            kind: license.kind,
        }
    }
}

/// Bucket counts of the compliance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub valid: u32,
    pub expiring_30_days: u32,
    pub expiring_60_days: u32,
    pub expired: u32,
    pub overused: u32,
    pub underutilized: u32,
}

/// License status distribution for audit purposes.
///
/// Every license lands in exactly one expiry bucket (the four bucket sizes
/// sum to `total_licenses`). The overused/underutilized flags are orthogonal
/// to the buckets: a license can be both expiring and overused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub report_date: DateTime<Utc>,
    pub total_licenses: u32,
    pub summary: ComplianceSummary,
    pub valid_licenses: Vec<LicenseComplianceRow>,
    pub expiring_30_days: Vec<LicenseComplianceRow>,
    pub expiring_60_days: Vec<LicenseComplianceRow>,
    pub expired_licenses: Vec<LicenseComplianceRow>,
    pub overused_licenses: Vec<LicenseComplianceRow>,
    pub underutilized_licenses: Vec<LicenseComplianceRow>,
    /// `valid / total * 100`, 0 when there are no licenses.
    pub compliance_rate: f64,
}
