//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Kind of entity referenced by an error or an audit record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    License,
    Device,
    Vendor,
    Assignment,
    SoftwareVersion,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::License => "license",
            EntityKind::Device => "device",
            EntityKind::Vendor => "vendor",
            EntityKind::Assignment => "assignment",
            EntityKind::SoftwareVersion => "software version",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// invariants, conflicts). Every variant carries enough context to be
/// actionable without consulting logs. `Store` is the one exception: an
/// opaque passthrough for infrastructure faults, kept distinct so callers can
/// tell "your request was rejected" from "the system could not be reached".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{entity} {key} not found")]
    NotFound { entity: EntityKind, key: String },

    /// The exact (license, device) pair is already live.
    #[error("license {license_key} already assigned to device {device_id}")]
    DuplicateAssignment {
        license_key: String,
        device_id: String,
    },

    /// The license's capacity would be exceeded.
    #[error("license {license_key} has reached maximum usage ({current}/{limit})")]
    CapacityExceeded {
        license_key: String,
        current: u32,
        limit: u32,
    },

    /// An entity with the same key already exists.
    #[error("{entity} {key} already exists")]
    AlreadyExists { entity: EntityKind, key: String },

    /// The request is valid but clashes with current state (e.g. deleting a
    /// vendor that licenses still reference).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input, rejected before any store mutation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage-level fault (connectivity, timeout). Never a business rejection.
    #[error("storage failure: {0}")]
    Store(String),
}

impl DomainError {
    pub fn not_found(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn already_exists(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
