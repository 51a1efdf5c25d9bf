//! Audit log model

use serde::{Deserialize, Serialize};
use shared::models::{AuditAction, AuditLogView, EntityKind};
use surrealdb::RecordId;

/// One append-only audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Operator who performed the action
    pub user: String,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    /// Entity snapshot before the action, opaque to the trail
    #[serde(default)]
    pub before: Option<serde_json::Value>,
    /// Entity snapshot after the action
    #[serde(default)]
    pub after: Option<serde_json::Value>,
    pub at: i64,
}

impl From<AuditLogEntry> for AuditLogView {
    fn from(e: AuditLogEntry) -> Self {
        AuditLogView {
            id: e.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            user: e.user,
            action: e.action,
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            before: e.before,
            after: e.after,
            at: e.at,
        }
    }
}
