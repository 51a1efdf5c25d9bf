//! Audit recorder — the producer side of the trail

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use super::storage::AuditStorage;
use crate::db::models::AuditLogEntry;
use shared::models::{AuditAction, AuditLogView, EntityKind};

/// One recorded action on its way to the audit worker.
#[derive(Debug)]
pub struct AuditEvent {
    pub user: String,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    /// Stamped at enqueue time so entries order by when the action
    /// happened, not when the worker drained them.
    pub at: i64,
}

/// Producer handle plus the query side of the audit trail.
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditEvent>,
    storage: AuditStorage,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

impl AuditRecorder {
    /// Create the recorder and the receiver its worker will drain.
    pub fn new(db: Surreal<Db>, buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let recorder = Arc::new(Self {
            tx,
            storage: AuditStorage::new(db),
        });
        (recorder, rx)
    }

    /// Record an action. Never fails: a full or closed channel drops the
    /// event with a log line.
    pub fn record(
        &self,
        user: &str,
        action: AuditAction,
        entity_type: EntityKind,
        entity_id: &str,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) {
        let event = AuditEvent {
            user: user.to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            before,
            after,
            at: shared::util::now_millis(),
        };
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, action = %action, "Audit event dropped");
        }
    }

    /// Audit trail for one entity, newest first, capped at 50.
    pub async fn list_for_entity(
        &self,
        entity_type: EntityKind,
        entity_id: &str,
    ) -> Result<Vec<AuditLogView>, shared::AppError> {
        let entries = self.storage.list_for_entity(entity_type, entity_id).await?;
        Ok(entries.into_iter().map(AuditLogView::from).collect())
    }

    /// Entries recorded by one operator, newest first, capped at 50.
    pub async fn list_for_user(&self, user: &str) -> Result<Vec<AuditLogView>, shared::AppError> {
        let entries = self.storage.list_for_user(user).await?;
        Ok(entries.into_iter().map(AuditLogView::from).collect())
    }
}

impl From<AuditEvent> for AuditLogEntry {
    fn from(e: AuditEvent) -> Self {
        AuditLogEntry {
            id: None,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn record_never_blocks_even_with_a_full_channel() {
        let db = init_memory_database().await.unwrap();
        let (recorder, _rx) = AuditRecorder::new(db, 1);

        // Nobody drains _rx: the second record overflows and is dropped,
        // but the call itself must return immediately.
        for _ in 0..3 {
            recorder.record(
                "user1",
                AuditAction::Restock,
                EntityKind::Inventory,
                "product:beans",
                None,
                None,
            );
        }
    }
}
