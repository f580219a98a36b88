use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use licwarden_core::{AssignmentId, DeviceId, LicenseKey, UserId};

/// A live binding of one license to one device, consuming one unit of the
/// license's capacity.
///
/// Invariants (enforced by the allocation engine and the store, not here):
/// at most one live assignment per (license, device) pair, and never more
/// live assignments for a license than its `max_usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub license_key: LicenseKey,
    pub device_id: DeviceId,
    pub assigned_by: UserId,
    pub assigned_at: DateTime<Utc>,
}
