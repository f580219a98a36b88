use chrono::NaiveDate;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use licwarden_core::{DeviceId, DomainError, DomainResult, SoftwareVersionId};

/// Patch-level status of a software installation.
///
/// A closed set validated at the boundary: anything outside the three
/// variants is rejected rather than stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    UpToDate,
    Outdated,
    Critical,
}

impl core::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            VersionStatus::UpToDate => "UP_TO_DATE",
            VersionStatus::Outdated => "OUTDATED",
            VersionStatus::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

impl FromStr for VersionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP_TO_DATE" => Ok(VersionStatus::UpToDate),
            "OUTDATED" => Ok(VersionStatus::Outdated),
            "CRITICAL" => Ok(VersionStatus::Critical),
            other => Err(DomainError::invalid_input(format!(
                "invalid status {other}: must be one of UP_TO_DATE, OUTDATED, CRITICAL"
            ))),
        }
    }
}

/// A software installation observed on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVersion {
    pub id: SoftwareVersionId,
    pub device_id: DeviceId,
    pub software_name: String,
    pub current_version: String,
    pub latest_version: Option<String>,
    pub status: VersionStatus,
    pub last_checked: NaiveDate,
}

/// Command: record a software version sighting on a device.
///
/// `status` arrives as a raw string and must parse from the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSoftwareVersion {
    pub id: SoftwareVersionId,
    pub device_id: DeviceId,
    pub software_name: String,
    pub current_version: String,
    pub latest_version: Option<String>,
    pub status: Option<String>,
    pub last_checked: NaiveDate,
}

impl NewSoftwareVersion {
    pub fn build(self) -> DomainResult<SoftwareVersion> {
        if self.software_name.trim().is_empty() {
            return Err(DomainError::invalid_input("software_name cannot be empty"));
        }
        if self.current_version.trim().is_empty() {
            return Err(DomainError::invalid_input(
                "current_version cannot be empty",
            ));
        }
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => VersionStatus::UpToDate,
        };
        Ok(SoftwareVersion {
            id: self.id,
            device_id: self.device_id,
            software_name: self.software_name,
            current_version: self.current_version,
            latest_version: self.latest_version,
            status,
            last_checked: self.last_checked,
        })
    }
}

/// Command: partial software-version update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVersionUpdate {
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub status: Option<String>,
    pub last_checked: Option<NaiveDate>,
}

impl SoftwareVersion {
    pub fn apply_update(&self, update: SoftwareVersionUpdate) -> DomainResult<SoftwareVersion> {
        let status = match update.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => self.status,
        };
        let current_version = update
            .current_version
            .unwrap_or_else(|| self.current_version.clone());
        if current_version.trim().is_empty() {
            return Err(DomainError::invalid_input(
                "current_version cannot be empty",
            ));
        }
        Ok(SoftwareVersion {
            id: self.id,
            device_id: self.device_id.clone(),
            software_name: self.software_name.clone(),
            current_version,
            latest_version: update.latest_version.or_else(|| self.latest_version.clone()),
            status,
            last_checked: update.last_checked.unwrap_or(self.last_checked),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_version() -> NewSoftwareVersion {
        NewSoftwareVersion {
            id: SoftwareVersionId::new(),
            device_id: DeviceId::from("DEV-001"),
            software_name: "IOS-XE".to_string(),
            current_version: "17.9.4".to_string(),
            latest_version: Some("17.12.1".to_string()),
            status: Some("OUTDATED".to_string()),
            last_checked: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[test]
    fn status_allow_list_is_closed() {
        assert_eq!(
            "UP_TO_DATE".parse::<VersionStatus>().unwrap(),
            VersionStatus::UpToDate
        );
        assert!("up_to_date".parse::<VersionStatus>().is_err());
        assert!("STALE".parse::<VersionStatus>().is_err());
        assert!("".parse::<VersionStatus>().is_err());
    }

    #[test]
    fn build_defaults_status_and_rejects_unknown() {
        let mut cmd = new_version();
        cmd.status = None;
        assert_eq!(cmd.build().unwrap().status, VersionStatus::UpToDate);

        let mut cmd = new_version();
        cmd.status = Some("BROKEN".to_string());
        assert!(cmd.build().is_err());
    }

    #[test]
    fn update_parses_status_from_allow_list() {
        let version = new_version().build().unwrap();
        let update = SoftwareVersionUpdate {
            status: Some("CRITICAL".to_string()),
            ..Default::default()
        };
        assert_eq!(
            version.apply_update(update).unwrap().status,
            VersionStatus::Critical
        );
    }
}
