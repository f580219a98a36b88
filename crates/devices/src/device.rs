use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use licwarden_core::{DeviceId, DomainError, DomainResult, IpAddress};

/// Lifecycle status of a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Active,
    Maintenance,
    Obsolete,
    Decommissioned,
}

impl core::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Maintenance => "MAINTENANCE",
            DeviceStatus::Obsolete => "OBSOLETE",
            DeviceStatus::Decommissioned => "DECOMMISSIONED",
        };
        f.write_str(s)
    }
}

impl FromStr for DeviceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(DeviceStatus::Active),
            "MAINTENANCE" => Ok(DeviceStatus::Maintenance),
            "OBSOLETE" => Ok(DeviceStatus::Obsolete),
            "DECOMMISSIONED" => Ok(DeviceStatus::Decommissioned),
            other => Err(DomainError::invalid_input(format!(
                "unknown device status: {other}"
            ))),
        }
    }
}

/// A network device that licenses can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub device_type: String,
    pub ip_address: IpAddress,
    pub location: String,
    pub model: Option<String>,
    pub status: DeviceStatus,
    pub created_at: DateTime<Utc>,
}

/// Command: register a new device. The IP arrives raw and is validated in
/// `build`, before any store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub id: DeviceId,
    pub device_type: String,
    pub ip_address: String,
    pub location: String,
    pub model: Option<String>,
    pub status: Option<DeviceStatus>,
    pub occurred_at: DateTime<Utc>,
}

impl NewDevice {
    pub fn build(self) -> DomainResult<Device> {
        if self.device_type.trim().is_empty() {
            return Err(DomainError::invalid_input("device_type cannot be empty"));
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::invalid_input("location cannot be empty"));
        }
        let ip_address = IpAddress::parse(&self.ip_address)?;
        Ok(Device {
            id: self.id,
            device_type: self.device_type,
            ip_address,
            location: self.location,
            model: self.model,
            status: self.status.unwrap_or(DeviceStatus::Active),
            created_at: self.occurred_at,
        })
    }
}

/// Command: partial device update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub device_type: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<String>,
    pub model: Option<String>,
    pub status: Option<DeviceStatus>,
}

impl Device {
    pub fn apply_update(&self, update: DeviceUpdate) -> DomainResult<Device> {
        let ip_address = match update.ip_address {
            Some(raw) => IpAddress::parse(&raw)?,
            None => self.ip_address.clone(),
        };
        let device_type = update.device_type.unwrap_or_else(|| self.device_type.clone());
        if device_type.trim().is_empty() {
            return Err(DomainError::invalid_input("device_type cannot be empty"));
        }
        let location = update.location.unwrap_or_else(|| self.location.clone());
        if location.trim().is_empty() {
            return Err(DomainError::invalid_input("location cannot be empty"));
        }
        Ok(Device {
            id: self.id.clone(),
            device_type,
            ip_address,
            location,
            model: update.model.or_else(|| self.model.clone()),
            status: update.status.unwrap_or(self.status),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_device() -> NewDevice {
        NewDevice {
            id: DeviceId::from("DEV-001"),
            device_type: "Workstation".to_string(),
            ip_address: "192.168.1.10".to_string(),
            location: "Office A".to_string(),
            model: None,
            status: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn build_defaults_to_active() {
        let device = new_device().build().unwrap();
        assert_eq!(device.status, DeviceStatus::Active);
    }

    #[test]
    fn build_rejects_bad_ip() {
        let mut cmd = new_device();
        cmd.ip_address = "300.1.1.1".to_string();
        assert!(cmd.build().is_err());
    }

    #[test]
    fn update_revalidates_ip() {
        let device = new_device().build().unwrap();
        let bad = DeviceUpdate {
            ip_address: Some("not-an-ip".to_string()),
            ..Default::default()
        };
        assert!(device.apply_update(bad).is_err());

        let ok = DeviceUpdate {
            status: Some(DeviceStatus::Maintenance),
            ..Default::default()
        };
        let updated = device.apply_update(ok).unwrap();
        assert_eq!(updated.status, DeviceStatus::Maintenance);
        assert_eq!(updated.ip_address, device.ip_address);
    }
}
