use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use licwarden_core::{DeviceId, IpAddress};
use licwarden_devices::Device;
use licwarden_licenses::License;

/// Severity of a device's license risk.
///
/// CRITICAL when at least one assigned license is already expired,
/// WARNING when the only findings are upcoming expiries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceRiskSeverity {
    Critical,
    Warning,
}

/// A soon-to-expire license on a device, with its remaining days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringLicenseDetail {
    pub name: String,
    pub days_left: i64,
}

/// Aggregate risk signal for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRiskReport {
    pub device_id: DeviceId,
    pub device_type: String,
    pub location: String,
    pub ip_address: IpAddress,
    pub expired_licenses: u32,
    pub expiring_soon: u32,
    pub expired_license_names: Vec<String>,
    pub expiring_license_details: Vec<ExpiringLicenseDetail>,
    pub severity: DeviceRiskSeverity,
    pub message: String,
}

/// Score one device against the licenses currently assigned to it.
///
/// Returns `None` when the device has neither expired nor soon-expiring
/// licenses; such devices do not appear in risk listings at all.
pub fn device_risk(
    device: &Device,
    assigned_licenses: &[License],
    today: NaiveDate,
    threshold_days: i64,
) -> Option<DeviceRiskReport> {
    let mut expired_names = Vec::new();
    let mut expiring_details = Vec::new();

    for license in assigned_licenses {
        if license.is_expired(today) {
            expired_names.push(license.software_name.clone());
        } else {
            let days_left = license.days_until_expiry(today);
            if days_left <= threshold_days {
                expiring_details.push(ExpiringLicenseDetail {
                    name: license.software_name.clone(),
                    days_left,
                });
            }
        }
    }

    if expired_names.is_empty() && expiring_details.is_empty() {
        return None;
    }

    let expired = expired_names.len() as u32;
    let expiring = expiring_details.len() as u32;
    Some(DeviceRiskReport {
        device_id: device.id.clone(),
        device_type: device.device_type.clone(),
        location: device.location.clone(),
        ip_address: device.ip_address.clone(),
        expired_licenses: expired,
        expiring_soon: expiring,
        expired_license_names: expired_names,
        expiring_license_details: expiring_details,
        severity: if expired > 0 {
            DeviceRiskSeverity::Critical
        } else {
            DeviceRiskSeverity::Warning
        },
        message: risk_message(expired, expiring),
    })
}

/// Score a fleet: CRITICAL devices before WARNING, more expired licenses
/// first within each severity, device id as tiebreak.
pub fn devices_at_risk(
    devices: &[(Device, Vec<License>)],
    today: NaiveDate,
    threshold_days: i64,
) -> Vec<DeviceRiskReport> {
    let mut reports: Vec<DeviceRiskReport> = devices
        .iter()
        .filter_map(|(device, licenses)| device_risk(device, licenses, today, threshold_days))
        .collect();

    reports.sort_by(|a, b| {
        (a.severity == DeviceRiskSeverity::Warning)
            .cmp(&(b.severity == DeviceRiskSeverity::Warning))
            .then_with(|| b.expired_licenses.cmp(&a.expired_licenses))
            .then_with(|| a.device_id.cmp(&b.device_id))
    });
    reports
}

fn risk_message(expired: u32, expiring_soon: u32) -> String {
    let mut parts = Vec::new();
    if expired > 0 {
        parts.push(format!(
            "{expired} expired license{}",
            if expired == 1 { "" } else { "s" }
        ));
    }
    if expiring_soon > 0 {
        parts.push(format!("{expiring_soon} expiring soon"));
    }
    parts.join(" \u{2022} ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use licwarden_core::{LicenseKey, VendorId};
    use licwarden_devices::NewDevice;
    use licwarden_licenses::{LicenseKind, NewLicense};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    fn device(id: &str) -> Device {
        NewDevice {
            id: DeviceId::from(id),
            device_type: "Firewall".to_string(),
            ip_address: "10.0.0.2".to_string(),
            location: "DC-2".to_string(),
            model: None,
            status: None,
            occurred_at: Utc::now(),
        }
        .build()
        .unwrap()
    }

    fn license(name: &str, expires_in_days: i64) -> License {
        NewLicense {
            key: LicenseKey::from(name),
            software_name: name.to_string(),
            vendor_id: VendorId::new(),
            valid_from: today() - chrono::Duration::days(400),
            valid_to: today() + chrono::Duration::days(expires_in_days),
            kind: LicenseKind::PerDevice,
            max_usage: 5,
            notes: None,
            occurred_at: Utc::now(),
        }
        .build()
        .unwrap()
    }

    #[test]
    fn healthy_device_produces_no_report() {
        let report = device_risk(&device("DEV-A"), &[license("VPN", 200)], today(), 15);
        assert!(report.is_none());
    }

    #[test]
    fn expired_license_makes_the_device_critical() {
        let licenses = vec![
            license("VPN", -10),
            license("IDS", -2),
            license("NMS", 10),
        ];
        let report = device_risk(&device("DEV-A"), &licenses, today(), 15).unwrap();
        assert_eq!(report.severity, DeviceRiskSeverity::Critical);
        assert_eq!(report.expired_licenses, 2);
        assert_eq!(report.expiring_soon, 1);
        assert_eq!(report.message, "2 expired licenses \u{2022} 1 expiring soon");
        assert_eq!(report.expiring_license_details[0].days_left, 10);
    }

    #[test]
    fn only_expiring_licenses_yield_a_warning() {
        let report = device_risk(&device("DEV-A"), &[license("VPN", 15)], today(), 15).unwrap();
        assert_eq!(report.severity, DeviceRiskSeverity::Warning);
        assert_eq!(report.message, "1 expiring soon");
    }

    #[test]
    fn fleet_sorts_critical_first_then_by_expired_count() {
        let fleet = vec![
            (device("DEV-WARN"), vec![license("A", 5)]),
            (device("DEV-BAD"), vec![license("B", -1)]),
            (
                device("DEV-WORSE"),
                vec![license("C", -1), license("D", -2)],
            ),
            (device("DEV-FINE"), vec![license("E", 300)]),
        ];
        let reports = devices_at_risk(&fleet, today(), 15);
        let ids: Vec<&str> = reports.iter().map(|r| r.device_id.as_str()).collect();
        assert_eq!(ids, vec!["DEV-WORSE", "DEV-BAD", "DEV-WARN"]);
    }
}
