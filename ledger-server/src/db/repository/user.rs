//! Operator profile repository
//!
//! Profiles are keyed by the external user id, so lookups are direct
//! record fetches. A missing profile is normal and means defaults.

use super::{BaseRepository, RepoResult};
use crate::db::models::UserProfile;
use shared::models::NotificationPrefs;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn profile_id(user: &str) -> RecordId {
        RecordId::from_table_key(USER_TABLE, user)
    }

    pub async fn find(&self, user: &str) -> RepoResult<Option<UserProfile>> {
        let profile: Option<UserProfile> =
            self.base.db().select(Self::profile_id(user)).await?;
        Ok(profile)
    }

    /// Notification preferences, defaulting to everything-enabled when no
    /// profile exists.
    pub async fn prefs_for(&self, user: &str) -> RepoResult<NotificationPrefs> {
        Ok(self
            .find(user)
            .await?
            .map(|p| p.notification_prefs)
            .unwrap_or_default())
    }

    pub async fn save_prefs(&self, user: &str, prefs: NotificationPrefs) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT $id SET notification_prefs = $prefs")
            .bind(("id", Self::profile_id(user)))
            .bind(("prefs", prefs))
            .await?;
        Ok(())
    }

    /// Bump the lifetime sale counter, creating the profile on first use.
    pub async fn increment_sales_created(&self, user: &str, by: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT $id SET stats.total_sales_created += $by")
            .bind(("id", Self::profile_id(user)))
            .bind(("by", by))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn missing_profile_means_default_prefs() {
        let db = init_memory_database().await.unwrap();
        let repo = UserRepository::new(db);
        let prefs = repo.prefs_for("nobody").await.unwrap();
        assert!(prefs.low_stock_alerts && prefs.dead_stock_alerts);
    }

    #[tokio::test]
    async fn counter_upsert_creates_then_accumulates() {
        let db = init_memory_database().await.unwrap();
        let repo = UserRepository::new(db);

        repo.increment_sales_created("user1", 2).await.unwrap();
        repo.increment_sales_created("user1", 3).await.unwrap();

        let profile = repo.find("user1").await.unwrap().unwrap();
        assert_eq!(profile.stats.total_sales_created, 5);
    }

    #[tokio::test]
    async fn saved_prefs_round_trip() {
        let db = init_memory_database().await.unwrap();
        let repo = UserRepository::new(db);

        let prefs = NotificationPrefs {
            dead_stock_alerts: false,
            ..Default::default()
        };
        repo.save_prefs("user1", prefs).await.unwrap();

        let loaded = repo.prefs_for("user1").await.unwrap();
        assert!(!loaded.dead_stock_alerts);
        assert!(loaded.low_stock_alerts);
    }
}
