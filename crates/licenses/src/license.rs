use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use licwarden_core::{DomainError, DomainResult, LicenseKey, ValidityWindow, VendorId};

/// Commercial model of a license.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseKind {
    #[serde(rename = "Per User")]
    PerUser,
    #[serde(rename = "Per Device")]
    PerDevice,
    #[serde(rename = "Enterprise")]
    Enterprise,
}

impl core::fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            LicenseKind::PerUser => "Per User",
            LicenseKind::PerDevice => "Per Device",
            LicenseKind::Enterprise => "Enterprise",
        };
        f.write_str(s)
    }
}

impl core::str::FromStr for LicenseKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Per User" => Ok(LicenseKind::PerUser),
            "Per Device" => Ok(LicenseKind::PerDevice),
            "Enterprise" => Ok(LicenseKind::Enterprise),
            other => Err(DomainError::invalid_input(format!(
                "unknown license kind: {other}"
            ))),
        }
    }
}

/// A capacity-bounded right to use software, valid within a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub key: LicenseKey,
    pub software_name: String,
    pub vendor_id: VendorId,
    #[serde(flatten)]
    pub validity: ValidityWindow,
    pub kind: LicenseKind,
    pub max_usage: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl License {
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        self.validity.days_until_expiry(today)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.validity.is_expired(today)
    }

    /// Share of capacity consumed by `current_usage` live assignments,
    /// rounded to two decimals. 0 when `max_usage` is 0 (no division).
    pub fn utilization_percent(&self, current_usage: u32) -> f64 {
        if self.max_usage == 0 {
            return 0.0;
        }
        let raw = f64::from(current_usage) / f64::from(self.max_usage) * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

/// Command: register a new license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLicense {
    pub key: LicenseKey,
    pub software_name: String,
    pub vendor_id: VendorId,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub kind: LicenseKind,
    pub max_usage: u32,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewLicense {
    /// Validate the command and build the record. Rejected before any store
    /// mutation.
    pub fn build(self) -> DomainResult<License> {
        if self.software_name.trim().is_empty() {
            return Err(DomainError::invalid_input("software_name cannot be empty"));
        }
        if self.max_usage == 0 {
            return Err(DomainError::invalid_input("max_usage must be positive"));
        }
        let validity = ValidityWindow::new(self.valid_from, self.valid_to)?;
        Ok(License {
            key: self.key,
            software_name: self.software_name,
            vendor_id: self.vendor_id,
            validity,
            kind: self.kind,
            max_usage: self.max_usage,
            notes: self.notes,
            created_at: self.occurred_at,
        })
    }
}

/// Command: partial license update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseUpdate {
    pub software_name: Option<String>,
    pub vendor_id: Option<VendorId>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub kind: Option<LicenseKind>,
    pub max_usage: Option<u32>,
    pub notes: Option<String>,
}

impl License {
    /// Merge an update into this record, revalidating the merged result.
    pub fn apply_update(&self, update: LicenseUpdate) -> DomainResult<License> {
        let software_name = update.software_name.unwrap_or_else(|| self.software_name.clone());
        if software_name.trim().is_empty() {
            return Err(DomainError::invalid_input("software_name cannot be empty"));
        }
        let max_usage = update.max_usage.unwrap_or(self.max_usage);
        if max_usage == 0 {
            return Err(DomainError::invalid_input("max_usage must be positive"));
        }
        let validity = ValidityWindow::new(
            update.valid_from.unwrap_or(self.validity.valid_from),
            update.valid_to.unwrap_or(self.validity.valid_to),
        )?;
        Ok(License {
            key: self.key.clone(),
            software_name,
            vendor_id: update.vendor_id.unwrap_or(self.vendor_id),
            validity,
            kind: update.kind.unwrap_or(self.kind),
            max_usage,
            notes: update.notes.or_else(|| self.notes.clone()),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_license() -> NewLicense {
        NewLicense {
            key: LicenseKey::from("LIC-001"),
            software_name: "Adobe Photoshop".to_string(),
            vendor_id: VendorId::new(),
            valid_from: date(2026, 1, 1),
            valid_to: date(2026, 12, 31),
            kind: LicenseKind::PerUser,
            max_usage: 5,
            notes: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn build_validates_inputs() {
        assert!(new_license().build().is_ok());

        let mut cmd = new_license();
        cmd.software_name = "  ".to_string();
        assert!(cmd.build().is_err());

        let mut cmd = new_license();
        cmd.max_usage = 0;
        assert!(cmd.build().is_err());

        let mut cmd = new_license();
        cmd.valid_to = cmd.valid_from;
        assert!(cmd.build().is_err());
    }

    #[test]
    fn utilization_percent_rounds_and_handles_zero_capacity() {
        let license = new_license().build().unwrap();
        assert_eq!(license.utilization_percent(3), 60.0);
        assert_eq!(license.utilization_percent(4), 80.0);

        let mut degenerate = license.clone();
        degenerate.max_usage = 0;
        assert_eq!(degenerate.utilization_percent(3), 0.0);

        let mut thirds = license;
        thirds.max_usage = 3;
        assert_eq!(thirds.utilization_percent(1), 33.33);
    }

    #[test]
    fn apply_update_revalidates_window() {
        let license = new_license().build().unwrap();
        let update = LicenseUpdate {
            valid_to: Some(date(2025, 1, 1)),
            ..Default::default()
        };
        assert!(license.apply_update(update).is_err());

        let update = LicenseUpdate {
            max_usage: Some(10),
            ..Default::default()
        };
        let updated = license.apply_update(update).unwrap();
        assert_eq!(updated.max_usage, 10);
        assert_eq!(updated.software_name, license.software_name);
    }
}
