//! Audit log storage
//!
//! Append and query only. The entry shape is `db::models::AuditLogEntry`.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::AuditLogEntry;
use shared::models::EntityKind;

const AUDIT_TABLE: &str = "audit_log";

/// Query page cap.
const QUERY_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for AuditStorageError {
    fn from(err: surrealdb::Error) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<AuditStorageError> for shared::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::AppError::internal(err.to_string())
    }
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

/// Audit log storage (SurrealDB).
#[derive(Clone)]
pub struct AuditStorage {
    db: Surreal<Db>,
}

impl AuditStorage {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Append one entry.
    pub async fn append(&self, entry: AuditLogEntry) -> AuditStorageResult<AuditLogEntry> {
        let created: Option<AuditLogEntry> =
            self.db.create(AUDIT_TABLE).content(entry).await?;
        created.ok_or_else(|| AuditStorageError::Database("Failed to append audit entry".into()))
    }

    /// Entries for one entity, newest first, capped at 50.
    pub async fn list_for_entity(
        &self,
        entity_type: EntityKind,
        entity_id: &str,
    ) -> AuditStorageResult<Vec<AuditLogEntry>> {
        let entries: Vec<AuditLogEntry> = self
            .db
            .query(
                "SELECT * FROM audit_log WHERE entity_type = $entity_type \
                 AND entity_id = $entity_id ORDER BY at DESC LIMIT $limit",
            )
            .bind(("entity_type", entity_type))
            .bind(("entity_id", entity_id.to_string()))
            .bind(("limit", QUERY_LIMIT as i64))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Entries recorded by one operator, newest first, capped at 50.
    pub async fn list_for_user(&self, user: &str) -> AuditStorageResult<Vec<AuditLogEntry>> {
        let entries: Vec<AuditLogEntry> = self
            .db
            .query(
                "SELECT * FROM audit_log WHERE user = $user \
                 ORDER BY at DESC LIMIT $limit",
            )
            .bind(("user", user.to_string()))
            .bind(("limit", QUERY_LIMIT as i64))
            .await?
            .take(0)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use shared::models::AuditAction;

    fn entry(user: &str, entity_id: &str, at: i64) -> AuditLogEntry {
        AuditLogEntry {
            id: None,
            user: user.into(),
            action: AuditAction::CreateSale,
            entity_type: EntityKind::Sale,
            entity_id: entity_id.into(),
            before: None,
            after: Some(serde_json::json!({"quantity": 2})),
            at,
        }
    }

    #[tokio::test]
    async fn queries_are_newest_first_and_scoped() {
        let db = init_memory_database().await.unwrap();
        let storage = AuditStorage::new(db);

        storage.append(entry("user1", "sale:a", 100)).await.unwrap();
        storage.append(entry("user1", "sale:b", 300)).await.unwrap();
        storage.append(entry("user2", "sale:a", 200)).await.unwrap();

        let by_entity = storage
            .list_for_entity(EntityKind::Sale, "sale:a")
            .await
            .unwrap();
        let stamps: Vec<i64> = by_entity.iter().map(|e| e.at).collect();
        assert_eq!(stamps, vec![200, 100]);

        let by_user = storage.list_for_user("user1").await.unwrap();
        let stamps: Vec<i64> = by_user.iter().map(|e| e.at).collect();
        assert_eq!(stamps, vec![300, 100]);
    }
}
