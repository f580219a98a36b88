use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licwarden_core::{DomainError, DomainResult, VendorId};

/// A software vendor. Referenced, not owned, by licenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub support_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Command: register a new vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVendor {
    pub id: VendorId,
    pub name: String,
    pub support_email: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewVendor {
    pub fn build(self) -> DomainResult<Vendor> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_input("vendor name cannot be empty"));
        }
        Ok(Vendor {
            id: self.id,
            name: self.name,
            support_email: self.support_email,
            created_at: self.occurred_at,
        })
    }
}
