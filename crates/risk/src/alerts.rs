use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use licwarden_core::{LicenseKey, VendorId};
use licwarden_licenses::License;

use crate::severity::{ExpirySeverity, UsageSeverity};

/// A license paired with its live assignment count, as fetched by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseUsage {
    pub license: License,
    pub assigned: u32,
}

/// Alert: a license expires within the lookahead window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub license_key: LicenseKey,
    pub software_name: String,
    pub vendor_id: VendorId,
    pub valid_to: NaiveDate,
    pub days_until_expiry: i64,
    pub assigned_devices: u32,
    pub severity: ExpirySeverity,
    pub message: String,
}

/// Licenses expiring within `[today, today + window_days]`, most urgent
/// first (ascending days to expiry, license key as tiebreak). Already
/// expired licenses are excluded; they are reported through the expired
/// counters, not as upcoming expiries.
pub fn expiring_licenses(
    licenses: &[LicenseUsage],
    today: NaiveDate,
    window_days: i64,
) -> Vec<ExpiryAlert> {
    let mut alerts: Vec<ExpiryAlert> = licenses
        .iter()
        .filter(|entry| {
            let days = entry.license.days_until_expiry(today);
            (0..=window_days).contains(&days)
        })
        .map(|entry| {
            let days = entry.license.days_until_expiry(today);
            ExpiryAlert {
                license_key: entry.license.key.clone(),
                software_name: entry.license.software_name.clone(),
                vendor_id: entry.license.vendor_id,
                valid_to: entry.license.validity.valid_to,
                days_until_expiry: days,
                assigned_devices: entry.assigned,
                severity: ExpirySeverity::classify(days),
                message: format!(
                    "{} expires in {} day{}",
                    entry.license.software_name,
                    days,
                    if days == 1 { "" } else { "s" }
                ),
            }
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.days_until_expiry
            .cmp(&b.days_until_expiry)
            .then_with(|| a.license_key.cmp(&b.license_key))
    });
    alerts
}

/// Alert: a license is at or near capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityAlert {
    pub license_key: LicenseKey,
    pub software_name: String,
    pub vendor_id: VendorId,
    pub current_usage: u32,
    pub max_usage: u32,
    pub available: i64,
    pub usage_percentage: f64,
    pub severity: UsageSeverity,
    pub message: String,
}

/// Licenses at or above `threshold_percent` utilization, fullest first
/// (descending percentage, license key as tiebreak).
pub fn overused_licenses(licenses: &[LicenseUsage], threshold_percent: f64) -> Vec<CapacityAlert> {
    let mut alerts: Vec<CapacityAlert> = licenses
        .iter()
        .filter_map(|entry| {
            let percentage = entry.license.utilization_percent(entry.assigned);
            if percentage < threshold_percent {
                return None;
            }
            Some(CapacityAlert {
                license_key: entry.license.key.clone(),
                software_name: entry.license.software_name.clone(),
                vendor_id: entry.license.vendor_id,
                current_usage: entry.assigned,
                max_usage: entry.license.max_usage,
                available: i64::from(entry.license.max_usage) - i64::from(entry.assigned),
                usage_percentage: percentage,
                severity: UsageSeverity::classify(percentage),
                message: format!(
                    "{} at {:.0}% capacity",
                    entry.license.software_name, percentage
                ),
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        b.usage_percentage
            .total_cmp(&a.usage_percentage)
            .then_with(|| a.license_key.cmp(&b.license_key))
    });
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use licwarden_licenses::{LicenseKind, NewLicense};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    fn usage(key: &str, expires_in_days: i64, assigned: u32, max_usage: u32) -> LicenseUsage {
        let license = NewLicense {
            key: LicenseKey::from(key),
            software_name: format!("{key} Suite"),
            vendor_id: VendorId::new(),
            valid_from: today() - chrono::Duration::days(365),
            valid_to: today() + chrono::Duration::days(expires_in_days),
            kind: LicenseKind::PerUser,
            max_usage,
            notes: None,
            occurred_at: Utc::now(),
        }
        .build()
        .unwrap();
        LicenseUsage { license, assigned }
    }

    #[test]
    fn expiring_list_is_sorted_most_urgent_first() {
        let licenses = vec![
            usage("LIC-20", 20, 1, 5),
            usage("LIC-5", 5, 2, 5),
            usage("LIC-29", 29, 0, 5),
        ];
        let alerts = expiring_licenses(&licenses, today(), 30);
        let days: Vec<i64> = alerts.iter().map(|a| a.days_until_expiry).collect();
        assert_eq!(days, vec![5, 20, 29]);
        assert_eq!(alerts[0].severity, ExpirySeverity::Critical);
        assert_eq!(alerts[0].message, "LIC-5 Suite expires in 5 days");
        assert_eq!(alerts[0].assigned_devices, 2);
    }

    #[test]
    fn expired_and_out_of_window_licenses_are_excluded() {
        let licenses = vec![
            usage("LIC-GONE", -3, 1, 5),
            usage("LIC-OK", 5, 1, 5),
            usage("LIC-FAR", 45, 1, 5),
        ];
        let alerts = expiring_licenses(&licenses, today(), 30);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].license_key, LicenseKey::from("LIC-OK"));
    }

    #[test]
    fn singular_day_message() {
        let alerts = expiring_licenses(&[usage("LIC-1", 1, 0, 5)], today(), 30);
        assert_eq!(alerts[0].message, "LIC-1 Suite expires in 1 day");
    }

    #[test]
    fn overused_list_is_sorted_fullest_first() {
        let licenses = vec![
            usage("LIC-A", 100, 3, 4),  // 75%
            usage("LIC-B", 100, 19, 20), // 95%
            usage("LIC-C", 100, 9, 10), // 90%
            usage("LIC-D", 100, 1, 10), // 10%, below threshold
        ];
        let alerts = overused_licenses(&licenses, 75.0);
        let keys: Vec<&str> = alerts.iter().map(|a| a.license_key.as_str()).collect();
        assert_eq!(keys, vec!["LIC-B", "LIC-C", "LIC-A"]);
        assert_eq!(alerts[0].severity, UsageSeverity::Critical);
        assert_eq!(alerts[1].severity, UsageSeverity::High);
        assert_eq!(alerts[2].severity, UsageSeverity::Warning);
        assert_eq!(alerts[2].message, "LIC-A Suite at 75% capacity");
    }

    proptest! {
        #[test]
        fn expiring_output_is_sorted_in_window_and_never_expired(
            days in proptest::collection::vec(-60i64..120, 0..40)
        ) {
            let licenses: Vec<LicenseUsage> = days
                .iter()
                .enumerate()
                .map(|(i, d)| usage(&format!("LIC-{i}"), *d, 1, 5))
                .collect();
            let alerts = expiring_licenses(&licenses, today(), 30);

            for pair in alerts.windows(2) {
                prop_assert!(pair[0].days_until_expiry <= pair[1].days_until_expiry);
            }
            for alert in &alerts {
                prop_assert!((0..=30).contains(&alert.days_until_expiry));
            }
            let expected = days.iter().filter(|d| (0..=30).contains(*d)).count();
            prop_assert_eq!(alerts.len(), expected);
        }
    }
}
