//! Sale repository
//!
//! Billing state transitions are guarded updates: the `WHERE
//! billing_status = ...` clause makes an illegal transition a no-op
//! instead of a corruption. Callers observe the rejection as `None`.

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::Sale;
use shared::models::BillingStatus;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const SALE_TABLE: &str = "sale";

/// `SELECT math::sum(quantity) ... GROUP ALL` row.
#[derive(Debug, serde::Deserialize)]
struct QuantitySum {
    total: i64,
}

#[derive(Debug, serde::Deserialize)]
struct SoldAtRow {
    sold_at: i64,
}

#[derive(Clone)]
pub struct SaleRepository {
    base: BaseRepository,
}

impl SaleRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn id_of(id: &str) -> RecordId {
        record_id(SALE_TABLE, id)
    }

    pub async fn create(&self, sale: Sale) -> RepoResult<Sale> {
        let created: Option<Sale> = self.base.db().create(SALE_TABLE).content(sale).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create sale".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        let sale: Option<Sale> = self.base.db().select(id.clone()).await?;
        Ok(sale)
    }

    pub async fn find_owned(&self, id: &RecordId, owner: &str) -> RepoResult<Option<Sale>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM sale WHERE id = $id AND owner = $owner")
            .bind(("id", id.clone()))
            .bind(("owner", owner.to_string()))
            .await?;
        let sales: Vec<Sale> = result.take(0)?;
        Ok(sales.into_iter().next())
    }

    /// An owner's sales, newest first.
    pub async fn list_for_owner(&self, owner: &str) -> RepoResult<Vec<Sale>> {
        let sales: Vec<Sale> = self
            .base
            .db()
            .query("SELECT * FROM sale WHERE owner = $owner ORDER BY sold_at DESC")
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(sales)
    }

    /// Total units ever sold of one product, across all time.
    pub async fn total_quantity_for_product(&self, product: &RecordId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT math::sum(quantity) AS total FROM sale \
                 WHERE product = $product GROUP ALL",
            )
            .bind(("product", product.clone()))
            .await?;
        let rows: Vec<QuantitySum> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    /// Timestamp of the product's earliest sale, if it ever sold.
    pub async fn first_sale_at(&self, product: &RecordId) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT sold_at FROM sale WHERE product = $product \
                 ORDER BY sold_at ASC LIMIT 1",
            )
            .bind(("product", product.clone()))
            .await?;
        let rows: Vec<SoldAtRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.sold_at))
    }

    // =========================================================================
    // Billing transitions (guarded)
    // =========================================================================

    /// GENERATING → GENERATED with the durable receipt reference.
    pub async fn mark_generated(
        &self,
        id: &RecordId,
        receipt_ref: &str,
    ) -> RepoResult<Option<Sale>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET billing_status = 'GENERATED', receipt_ref = $reference, \
                 next_billing_attempt_at = NONE \
                 WHERE billing_status = 'GENERATING' RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("reference", receipt_ref.to_string()))
            .await?;
        let updated: Vec<Sale> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// GENERATING → FAILED, recording the attempt count and the backoff
    /// deadline for the next retry.
    pub async fn mark_failed(
        &self,
        id: &RecordId,
        attempts: u32,
        next_attempt_at: i64,
    ) -> RepoResult<Option<Sale>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET billing_status = 'FAILED', billing_attempts = $attempts, \
                 next_billing_attempt_at = $next \
                 WHERE billing_status = 'GENERATING' RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("attempts", attempts))
            .bind(("next", next_attempt_at))
            .await?;
        let updated: Vec<Sale> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// FAILED → ABANDONED. Terminal; the sale leaves the retry pool.
    pub async fn mark_abandoned(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET billing_status = 'ABANDONED', next_billing_attempt_at = NONE \
                 WHERE billing_status = 'FAILED' RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .await?;
        let updated: Vec<Sale> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// FAILED → GENERATING: claim a sale for a retry attempt. Two
    /// concurrent sweeps cannot both claim the same sale.
    pub async fn mark_generating(&self, id: &RecordId) -> RepoResult<Option<Sale>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET billing_status = 'GENERATING' \
                 WHERE billing_status = 'FAILED' RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .await?;
        let updated: Vec<Sale> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// FAILED sales whose backoff deadline has passed, oldest deadline
    /// first, capped at `limit`.
    pub async fn find_failed_due(&self, now: i64, limit: usize) -> RepoResult<Vec<Sale>> {
        let sales: Vec<Sale> = self
            .base
            .db()
            .query(
                "SELECT * FROM sale WHERE billing_status = 'FAILED' \
                 AND (next_billing_attempt_at = NONE OR next_billing_attempt_at <= $now) \
                 ORDER BY next_billing_attempt_at ASC LIMIT $limit",
            )
            .bind(("now", now))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(sales)
    }
}
