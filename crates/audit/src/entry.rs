use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use licwarden_core::{EntityKind, UserId};

/// Verb of a mutating action, as it appears in the audit trail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Assign,
    Release,
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Assign => "ASSIGN",
            AuditAction::Release => "RELEASE",
        };
        f.write_str(s)
    }
}

/// One row of the append-only audit trail.
///
/// Carries the full 5-tuple a recorder needs: who, what kind of entity,
/// which entity, which verb, and a human-readable detail string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: UserId,
    pub entity: EntityKind,
    pub entity_id: String,
    pub action: AuditAction,
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: UserId,
        entity: EntityKind,
        entity_id: impl Into<String>,
        action: AuditAction,
        detail: impl Into<Option<String>>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            actor,
            entity,
            entity_id: entity_id.into(),
            action,
            detail: detail.into(),
            recorded_at,
        }
    }
}
