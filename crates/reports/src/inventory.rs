use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use licwarden_core::{DeviceId, IpAddress, VendorId};

/// One device as it appears in the inventory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInventoryRow {
    pub device_id: DeviceId,
    pub device_type: String,
    pub location: String,
    pub ip_address: IpAddress,
    pub status: String,
    pub model: Option<String>,
    pub assigned_licenses: u32,
}

/// Fleet inventory: totals and breakdowns by status, location and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInventoryReport {
    pub report_date: DateTime<Utc>,
    pub total_devices: u32,
    pub status_breakdown: BTreeMap<String, u32>,
    pub location_breakdown: BTreeMap<String, u32>,
    pub type_breakdown: BTreeMap<String, u32>,
    pub devices_with_licenses: Vec<DeviceInventoryRow>,
    pub devices_without_licenses: Vec<DeviceInventoryRow>,
}

/// Per-vendor license posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAnalysisRow {
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub support_email: Option<String>,
    pub total_licenses: u32,
    pub expired_licenses: u32,
    pub expiring_soon: u32,
    pub total_capacity: u64,
    pub total_usage: u64,
    /// Aggregate usage across all the vendor's licenses, 0 when the vendor
    /// has no capacity at all.
    pub utilization_percentage: f64,
}

/// License distribution by vendor, largest portfolios first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAnalysisReport {
    pub report_date: DateTime<Utc>,
    pub total_vendors: u32,
    pub vendor_analysis: Vec<VendorAnalysisRow>,
}
