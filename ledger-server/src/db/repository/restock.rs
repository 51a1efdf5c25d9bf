//! Restock event repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::RestockEvent;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const RESTOCK_TABLE: &str = "restock_event";

/// History page cap.
const HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct RestockRepository {
    base: BaseRepository,
}

impl RestockRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, event: RestockEvent) -> RepoResult<RestockEvent> {
        let created: Option<RestockEvent> =
            self.base.db().create(RESTOCK_TABLE).content(event).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create restock event".to_string()))
    }

    /// A product's restock history, newest first, capped at 50.
    pub async fn history_for_product(&self, product: &RecordId) -> RepoResult<Vec<RestockEvent>> {
        let events: Vec<RestockEvent> = self
            .base
            .db()
            .query(
                "SELECT * FROM restock_event WHERE product = $product \
                 ORDER BY restocked_at DESC LIMIT $limit",
            )
            .bind(("product", product.clone()))
            .bind(("limit", HISTORY_LIMIT as i64))
            .await?
            .take(0)?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::db::models::RestockSource;

    #[tokio::test]
    async fn history_is_newest_first_per_product() {
        let db = init_memory_database().await.unwrap();
        let repo = RestockRepository::new(db);
        let beans = RecordId::from_table_key("product", "beans");
        let rice = RecordId::from_table_key("product", "rice");

        for (product, at) in [(&beans, 100), (&rice, 200), (&beans, 300)] {
            repo.create(RestockEvent {
                id: None,
                product: product.clone(),
                quantity_added: 10,
                restocked_by: "user1".into(),
                restocked_at: at,
                supplier_name: None,
                cost_price: None,
                source: RestockSource::Restock,
            })
            .await
            .unwrap();
        }

        let history = repo.history_for_product(&beans).await.unwrap();
        let stamps: Vec<i64> = history.iter().map(|e| e.restocked_at).collect();
        assert_eq!(stamps, vec![300, 100]);
    }
}
