use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time dashboard counters.
///
/// `critical_alerts` is the number of CRITICAL-severity items across the
/// three alert categories (expiring licenses, overused licenses, devices at
/// risk) — the "what needs attention right now" number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_devices: u32,
    pub active_devices: u32,
    pub maintenance_devices: u32,
    pub decommissioned_devices: u32,
    pub total_licenses: u32,
    pub expired_licenses: u32,
    pub expiring_licenses_count: u32,
    pub overused_licenses_count: u32,
    pub devices_at_risk_count: u32,
    pub critical_alerts: u32,
    pub generated_at: DateTime<Utc>,
}
