//! Notification repository

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_id};
use crate::db::models::Notification;
use shared::models::NotificationKind;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const NOTIFICATION_TABLE: &str = "notification";

/// Hard page cap on list queries.
const LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn id_of(id: &str) -> RecordId {
        record_id(NOTIFICATION_TABLE, id)
    }

    pub async fn create(&self, notification: Notification) -> RepoResult<Notification> {
        let created: Option<Notification> = self
            .base
            .db()
            .create(NOTIFICATION_TABLE)
            .content(notification)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// Whether an unread alert of this kind already exists for
    /// (user, product). Read-state dedup for LOW_STOCK and
    /// FORECAST_WARNING.
    pub async fn has_unread(
        &self,
        user: &str,
        product: &RecordId,
        kind: NotificationKind,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM notification WHERE user = $user \
                 AND product = $product AND kind = $kind AND is_read = false \
                 GROUP ALL",
            )
            .bind(("user", user.to_string()))
            .bind(("product", product.clone()))
            .bind(("kind", kind))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count > 0).unwrap_or(false))
    }

    /// Whether any alert of this kind was created for (user, product)
    /// after `since`, read or not. Rolling-window dedup for DEAD_STOCK.
    pub async fn has_since(
        &self,
        user: &str,
        product: &RecordId,
        kind: NotificationKind,
        since: i64,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM notification WHERE user = $user \
                 AND product = $product AND kind = $kind AND created_at > $since \
                 GROUP ALL",
            )
            .bind(("user", user.to_string()))
            .bind(("product", product.clone()))
            .bind(("kind", kind))
            .bind(("since", since))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count > 0).unwrap_or(false))
    }

    /// A user's notifications, newest first, capped at 100.
    pub async fn list_for_user(
        &self,
        user: &str,
        unread_only: bool,
    ) -> RepoResult<Vec<Notification>> {
        let sql = if unread_only {
            "SELECT * FROM notification WHERE user = $user AND is_read = false \
             ORDER BY created_at DESC LIMIT $limit"
        } else {
            "SELECT * FROM notification WHERE user = $user \
             ORDER BY created_at DESC LIMIT $limit"
        };
        let notifications: Vec<Notification> = self
            .base
            .db()
            .query(sql)
            .bind(("user", user.to_string()))
            .bind(("limit", LIST_LIMIT as i64))
            .await?
            .take(0)?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM notification WHERE user = $user \
                 AND is_read = false GROUP ALL",
            )
            .bind(("user", user.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Mark one notification read. Scoped to the owner: someone else's
    /// notification is reported as missing.
    pub async fn mark_read(&self, id: &RecordId, user: &str) -> RepoResult<Option<Notification>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET is_read = true WHERE user = $user RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("user", user.to_string()))
            .await?;
        let updated: Vec<Notification> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Mark everything read; returns how many flipped. Idempotent
    /// (a second call flips nothing).
    pub async fn mark_all_read(&self, user: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE notification SET is_read = true \
                 WHERE user = $user AND is_read = false RETURN AFTER",
            )
            .bind(("user", user.to_string()))
            .await?;
        let updated: Vec<Notification> = result.take(0)?;
        Ok(updated.len() as u64)
    }
}
