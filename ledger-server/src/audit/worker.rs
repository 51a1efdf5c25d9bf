//! Audit background worker
//!
//! Drains the recorder's channel into the `audit_log` table. Exits when
//! the channel closes (all recorder handles dropped at shutdown).

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use super::recorder::AuditEvent;
use super::storage::AuditStorage;
use crate::db::models::AuditLogEntry;

pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            storage: AuditStorage::new(db),
        }
    }

    /// Run until the channel closes. Insert failures are logged and the
    /// event is lost; the trail is best effort by design.
    pub async fn run(self, mut rx: mpsc::Receiver<AuditEvent>) {
        tracing::info!("Audit worker started");

        while let Some(event) = rx.recv().await {
            let entry = AuditLogEntry::from(event);
            match self.storage.append(entry).await {
                Ok(entry) => {
                    tracing::debug!(
                        action = %entry.action,
                        entity = %entry.entity_type,
                        entity_id = %entry.entity_id,
                        "Audit entry recorded"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to write audit entry");
                }
            }
        }

        tracing::info!("Audit channel closed, worker stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditRecorder;
    use crate::db::init_memory_database;
    use shared::models::{AuditAction, EntityKind};

    #[tokio::test]
    async fn worker_drains_recorded_events_into_the_table() {
        let db = init_memory_database().await.unwrap();
        let (recorder, rx) = AuditRecorder::new(db.clone(), 16);

        recorder.record(
            "user1",
            AuditAction::CreateSale,
            EntityKind::Sale,
            "sale:s1",
            None,
            Some(serde_json::json!({"quantity": 2})),
        );

        // Dropping the producer closes the channel so run() terminates.
        drop(recorder);
        AuditWorker::new(db.clone()).run(rx).await;

        let stored = AuditStorage::new(db)
            .list_for_user("user1")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].entity_id, "sale:s1");
        assert_eq!(stored[0].action, AuditAction::CreateSale);
    }
}
