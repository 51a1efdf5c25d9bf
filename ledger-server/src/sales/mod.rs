//! Sale transaction pipeline
//!
//! `SaleTransactionCoordinator` drives the two-phase sale commit:
//!
//! 1. acquire per-product locks (sorted order, deadlock-free)
//! 2. validate every line — any error rejects the whole request with
//!    zero mutation
//! 3. commit line by line: conditional inventory decrement, sale row,
//!    forecast recompute, audit entry, alert checks
//! 4. bump the owner's sale counter, release the locks
//! 5. run billing for the committed batch (failure never rolls back)

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OwnedMutexGuard;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::Sale;
use crate::db::repository::{ProductRepository, SaleRepository, UserRepository};
use crate::forecast::ForecastEngine;
use crate::notify::NotificationEngine;
use rust_decimal::Decimal;
use shared::models::{AuditAction, BillingStatus, CreateSaleRequest, EntityKind, SaleView};
use shared::util::now_millis;
use shared::{AppError, AppResult};
use surrealdb::RecordId;

/// Per-product async lock registry.
///
/// Entries are created on first use and kept for the process lifetime;
/// the registry is bounded by the catalog size.
pub struct ProductLocks {
    locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Lock a set of products. Keys are deduplicated and acquired in
    /// sorted order so two overlapping requests can never deadlock.
    pub async fn lock_many(&self, keys: &[String]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock_for(key).lock_owned().await);
        }
        guards
    }
}

impl Default for ProductLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// One line that passed validation, carrying its pre-commit snapshot.
struct ValidatedLine {
    product_id: RecordId,
    quantity: i64,
}

pub struct SaleTransactionCoordinator {
    state: ServerState,
}

impl SaleTransactionCoordinator {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Run the full pipeline for one request. Returns the committed
    /// lines with whatever billing status resulted — billing failure is
    /// not a request failure.
    pub async fn create_sale(
        &self,
        owner: &str,
        request: CreateSaleRequest,
    ) -> AppResult<Vec<SaleView>> {
        request
            .validate()
            .map_err(|e| AppError::validation(flatten_validation_errors(&e)))?;

        let products = ProductRepository::new(self.state.db.clone());
        let sales = SaleRepository::new(self.state.db.clone());
        let forecast = ForecastEngine::new(self.state.db.clone());
        let notify = NotificationEngine::new(self.state.db.clone());

        // Hold every involved product's lock through validate + commit.
        let lock_keys: Vec<String> = request
            .lines
            .iter()
            .map(|l| ProductRepository::id_of(&l.product_id).to_string())
            .collect();
        let guards = self.state.product_locks.lock_many(&lock_keys).await;

        // ---- Validation phase: collect every line error, mutate nothing.
        let mut errors: Vec<String> = Vec::new();
        let mut validated: Vec<ValidatedLine> = Vec::new();
        // Lines may repeat a product; availability is checked against the
        // cumulative requested quantity.
        let mut requested_so_far: std::collections::HashMap<String, i64> =
            std::collections::HashMap::new();

        for line in &request.lines {
            let product_id = ProductRepository::id_of(&line.product_id);
            let product = match products.find_owned(&product_id, owner).await {
                Ok(Some(p)) => p,
                Ok(None) => {
                    errors.push(format!(
                        "Product {} not found or unauthorized",
                        line.product_id
                    ));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let already = requested_so_far
                .entry(product_id.to_string())
                .or_insert(0);
            if product.inventory < *already + line.quantity {
                errors.push(format!(
                    "Insufficient inventory for \"{}\". Available: {}, Requested: {}",
                    product.name,
                    product.inventory - *already,
                    line.quantity
                ));
                continue;
            }
            *already += line.quantity;

            validated.push(ValidatedLine {
                product_id,
                quantity: line.quantity,
            });
        }

        if !errors.is_empty() {
            return Err(AppError::validation(errors.join("; ")));
        }

        // ---- Commit phase: per line, in input order.
        let now = now_millis();
        let mut committed: Vec<Sale> = Vec::with_capacity(validated.len());

        for line in &validated {
            let before = products
                .find_by_id(&line.product_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::internal("product vanished during commit"))?;

            // Validation passed under the lock, so the store-level guard
            // only trips if something bypassed this pipeline entirely.
            let mut after = products
                .try_decrement_inventory(&line.product_id, line.quantity, now)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| {
                    tracing::error!(
                        product = %line.product_id,
                        "Inventory guard rejected a validated decrement"
                    );
                    AppError::internal("inventory changed during commit")
                })?;

            let quantity = Decimal::from(line.quantity);
            let sale = sales
                .create(Sale {
                    id: None,
                    owner: owner.to_string(),
                    customer_name: request.customer_name.clone(),
                    customer_email: request.customer_email.clone(),
                    product: line.product_id.clone(),
                    product_name: before.name.clone(),
                    quantity: line.quantity,
                    unit_price: before.unit_price,
                    unit_cost: before.unit_cost,
                    amount: before.unit_price * quantity,
                    sold_at: now,
                    billing_status: BillingStatus::Generating,
                    billing_attempts: 0,
                    next_billing_attempt_at: None,
                    receipt_ref: None,
                })
                .await
                .map_err(AppError::from)?;

            // Recompute over the full history, this sale included.
            match forecast.recompute(&line.product_id).await {
                Ok(avg) => after.daily_sales_avg = avg,
                Err(e) => {
                    tracing::warn!(product = %line.product_id, error = %e, "Forecast recompute failed")
                }
            }

            self.state.audit.record(
                owner,
                AuditAction::CreateSale,
                EntityKind::Sale,
                &sale.id_string(),
                serde_json::to_value(&before).ok(),
                serde_json::to_value(&after).ok(),
            );

            // Alert checks are fire-and-forget.
            notify.check_low_stock(&after).await;
            notify.check_forecast_warning(&after).await;

            committed.push(sale);
        }

        // ---- Aggregate phase.
        if let Err(e) = UserRepository::new(self.state.db.clone())
            .increment_sales_created(owner, committed.len() as i64)
            .await
        {
            tracing::warn!(owner = %owner, error = %e, "Failed to bump sale counter");
        }

        // Billing does not touch inventory; release the locks first.
        drop(guards);

        // ---- Billing phase: one composite receipt for the batch.
        if let Err(e) = self.state.billing.generate(&committed).await {
            tracing::warn!(error = %e, "Billing failed, sale lines queued for retry");
        }

        // Re-read for the final billing status of each line.
        let mut views = Vec::with_capacity(committed.len());
        for sale in committed {
            let id = sale.id.clone();
            let fresh = match &id {
                Some(id) => sales.find_by_id(id).await.map_err(AppError::from)?,
                None => None,
            };
            views.push(SaleView::from(fresh.unwrap_or(sale)));
        }
        Ok(views)
    }
}

/// Join validator output into the single `"; "`-separated string the API
/// reports.
pub(crate) fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_validation_errors(errors, &mut parts);
    if parts.is_empty() {
        "Invalid request".to_string()
    } else {
        parts.join("; ")
    }
}

fn collect_validation_errors(errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    match &err.message {
                        Some(msg) => out.push(msg.to_string()),
                        None => out.push(format!("{field} is invalid")),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(nested, out),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_validation_errors(nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_many_deduplicates_and_sorts() {
        let locks = ProductLocks::new();
        let keys = vec![
            "product:b".to_string(),
            "product:a".to_string(),
            "product:b".to_string(),
        ];
        let guards = locks.lock_many(&keys).await;
        assert_eq!(guards.len(), 2);
        drop(guards);

        // Released locks can be re-acquired.
        let again = locks.lock_many(&keys).await;
        assert_eq!(again.len(), 2);
    }

    #[tokio::test]
    async fn overlapping_lock_sets_serialize() {
        let locks = Arc::new(ProductLocks::new());
        let keys = vec!["product:a".to_string()];

        let guards = locks.lock_many(&keys).await;
        let contender = {
            let locks = locks.clone();
            let keys = keys.clone();
            tokio::spawn(async move {
                let _guards = locks.lock_many(&keys).await;
            })
        };

        // The contender cannot finish while we hold the lock.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guards);
        contender.await.unwrap();
    }

    #[test]
    fn validation_errors_join_with_semicolons() {
        let request = CreateSaleRequest {
            customer_name: String::new(),
            customer_email: "nope".into(),
            lines: vec![],
        };
        let err = request.validate().unwrap_err();
        let joined = flatten_validation_errors(&err);
        assert!(joined.contains("customer_name is required"));
        assert!(joined.contains("customer_email must be a valid email"));
        assert!(joined.contains("at least one line is required"));
    }
}
