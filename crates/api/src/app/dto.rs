use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use licwarden_licenses::LicenseKind;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateVendorRequest {
    pub name: String,
    pub support_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    pub device_id: String,
    pub device_type: String,
    pub ip_address: String,
    pub location: String,
    pub model: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeviceRequest {
    pub device_type: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLicenseRequest {
    pub license_key: String,
    pub software_name: String,
    pub vendor_id: Uuid,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub license_type: LicenseKind,
    pub max_usage: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLicenseRequest {
    pub software_name: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub license_type: Option<LicenseKind>,
    pub max_usage: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub license_key: String,
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSoftwareVersionRequest {
    pub software_name: String,
    pub current_version: String,
    pub latest_version: Option<String>,
    pub status: Option<String>,
    pub last_checked: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSoftwareVersionRequest {
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub status: Option<String>,
    pub last_checked: Option<NaiveDate>,
}

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct DeviceListQuery {
    pub location: Option<String>,
    pub device_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LicenseListQuery {
    pub vendor_id: Option<Uuid>,
    pub software_name: Option<String>,
    #[serde(default)]
    pub expired_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdQuery {
    pub threshold: Option<f64>,
}
