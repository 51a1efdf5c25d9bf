//! Product repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Parse a product id from its API string form.
    pub fn id_of(id: &str) -> RecordId {
        record_id(PRODUCT_TABLE, id)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Find a product only if it belongs to `owner`. A foreign product is
    /// indistinguishable from a missing one.
    pub async fn find_owned(&self, id: &RecordId, owner: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id = $id AND owner = $owner")
            .bind(("id", id.clone()))
            .bind(("owner", owner.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// All products of one owner.
    pub async fn find_all_owned(&self, owner: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE owner = $owner ORDER BY name")
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Every product in the store. Maintenance sweeps only.
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self.base.db().select(PRODUCT_TABLE).await?;
        Ok(products)
    }

    /// Products with any demand signal, for the forecast-warning sweep.
    pub async fn find_with_positive_avg(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE daily_sales_avg > 0")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.inventory < 0 {
            return Err(RepoError::Validation("inventory cannot be negative".into()));
        }
        let product = Product {
            id: None,
            owner: data.owner,
            name: data.name,
            unit_price: data.unit_price,
            unit_cost: data.unit_cost,
            inventory: data.inventory,
            min_threshold: data.min_threshold.unwrap_or(10),
            daily_sales_avg: 0.0,
            last_sold_at: None,
            category: data.category,
            category_name: data.category_name,
            created_at: shared::util::now_millis(),
        };
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Atomic conditional decrement: take `qty` units and stamp
    /// `last_sold_at`, but only while enough inventory remains.
    ///
    /// Returns the post-decrement product, or `None` when the guard
    /// rejected the update (insufficient inventory). The store-level
    /// condition is the final defence under concurrent commits.
    pub async fn try_decrement_inventory(
        &self,
        id: &RecordId,
        qty: i64,
        now: i64,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET inventory -= $qty, last_sold_at = $now \
                 WHERE inventory >= $qty RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("qty", qty))
            .bind(("now", now))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Add units back (restock). Quantity has been validated positive.
    pub async fn add_inventory(&self, id: &RecordId, qty: i64) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET inventory += $qty RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("qty", qty))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))
    }

    /// Store a freshly recomputed demand estimate.
    pub async fn set_daily_avg(&self, id: &RecordId, avg: f64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET daily_sales_avg = $avg")
            .bind(("id", id.clone()))
            .bind(("avg", avg))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use rust_decimal::Decimal;

    fn sample(owner: &str, name: &str, inventory: i64) -> ProductCreate {
        ProductCreate {
            owner: owner.into(),
            name: name.into(),
            unit_price: Decimal::new(1050, 2),
            unit_cost: Decimal::new(400, 2),
            inventory,
            min_threshold: None,
            category: None,
            category_name: None,
        }
    }

    #[tokio::test]
    async fn decrement_respects_the_inventory_guard() {
        let db = init_memory_database().await.unwrap();
        let repo = ProductRepository::new(db);
        let product = repo.create(sample("user1", "Beans", 5)).await.unwrap();
        let id = product.id.clone().unwrap();

        let after = repo
            .try_decrement_inventory(&id, 3, 1_000)
            .await
            .unwrap()
            .expect("guard should allow 3 of 5");
        assert_eq!(after.inventory, 2);
        assert_eq!(after.last_sold_at, Some(1_000));

        // 4 > 2 remaining: the guard rejects and nothing changes.
        let rejected = repo.try_decrement_inventory(&id, 4, 2_000).await.unwrap();
        assert!(rejected.is_none());
        let unchanged = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(unchanged.inventory, 2);
        assert_eq!(unchanged.last_sold_at, Some(1_000));
    }

    #[tokio::test]
    async fn ownership_scopes_lookups() {
        let db = init_memory_database().await.unwrap();
        let repo = ProductRepository::new(db);
        let product = repo.create(sample("user1", "Beans", 5)).await.unwrap();
        let id = product.id.clone().unwrap();

        assert!(repo.find_owned(&id, "user1").await.unwrap().is_some());
        assert!(repo.find_owned(&id, "user2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restock_adds_inventory() {
        let db = init_memory_database().await.unwrap();
        let repo = ProductRepository::new(db);
        let product = repo.create(sample("user1", "Beans", 5)).await.unwrap();
        let id = product.id.clone().unwrap();

        let after = repo.add_inventory(&id, 20).await.unwrap();
        assert_eq!(after.inventory, 25);
    }
}
