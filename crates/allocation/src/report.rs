use serde::{Deserialize, Serialize};

use licwarden_core::LicenseKey;
use licwarden_licenses::License;

/// Inline utilization status tier.
///
/// Thresholds: CRITICAL at >= 90%, WARNING at >= 70%. This scale colors the
/// per-license utilization readout; the risk scorer's alerting scale
/// (95/90/75) is a different policy and the two are kept separate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UtilizationStatus {
    Ok,
    Warning,
    Critical,
}

impl UtilizationStatus {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            UtilizationStatus::Critical
        } else if percent >= 70.0 {
            UtilizationStatus::Warning
        } else {
            UtilizationStatus::Ok
        }
    }
}

/// Point-in-time utilization of one license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReport {
    pub license_key: LicenseKey,
    pub software_name: String,
    pub max_usage: u32,
    pub current_usage: u32,
    /// Remaining capacity. Reported even when zero or negative.
    pub available: i64,
    pub utilization_percent: f64,
    pub status: UtilizationStatus,
}

impl UtilizationReport {
    pub fn for_license(license: &License, current_usage: u32) -> Self {
        let utilization_percent = license.utilization_percent(current_usage);
        Self {
            license_key: license.key.clone(),
            software_name: license.software_name.clone(),
            max_usage: license.max_usage,
            current_usage,
            available: i64::from(license.max_usage) - i64::from(current_usage),
            utilization_percent,
            status: UtilizationStatus::from_percent(utilization_percent),
        }
    }
}
