//! Demand forecasting
//!
//! A product's demand signal is one number: `daily_sales_avg`, total
//! units ever sold divided by whole days since the first sale (rounded
//! up, never less than one). The recompute reads the full persisted sale
//! history, so it is idempotent and self-correcting — replaying it after
//! a crash converges on the same value.

use shared::models::SuggestedRestockView;
use shared::util::{days_elapsed_at_least_one, now_millis};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, RepoResult, SaleRepository};

/// A forecast warning fires when projected depletion is this many days
/// away or fewer.
pub const WARNING_MAX_DAYS_LEFT: f64 = 6.0;

#[derive(Clone)]
pub struct ForecastEngine {
    products: ProductRepository,
    sales: SaleRepository,
}

impl ForecastEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            sales: SaleRepository::new(db),
        }
    }

    /// Recompute and persist `daily_sales_avg` for one product from its
    /// full sale history. Returns the new value.
    ///
    /// No sales at all means no signal: the average snaps back to 0.
    pub async fn recompute(&self, product_id: &RecordId) -> RepoResult<f64> {
        let total = self.sales.total_quantity_for_product(product_id).await?;
        let avg = match self.sales.first_sale_at(product_id).await? {
            Some(first) if total > 0 => {
                let days = days_elapsed_at_least_one(first, now_millis());
                total as f64 / days as f64
            }
            _ => 0.0,
        };
        self.products.set_daily_avg(product_id, avg).await?;
        Ok(avg)
    }

    /// Days until depletion at the current rate; `None` without a signal.
    pub fn days_left(product: &Product) -> Option<f64> {
        if product.daily_sales_avg > 0.0 {
            Some(product.inventory as f64 / product.daily_sales_avg)
        } else {
            None
        }
    }

    /// Whether the product depletes within [`WARNING_MAX_DAYS_LEFT`] days.
    pub fn depletes_soon(product: &Product) -> bool {
        matches!(Self::days_left(product), Some(days) if days <= WARNING_MAX_DAYS_LEFT)
    }

    /// Units to order to cover `lead_time_days` of expected demand.
    pub fn suggested_restock_qty(product: &Product, lead_time_days: i64) -> i64 {
        (product.daily_sales_avg * lead_time_days.max(0) as f64).ceil() as i64
    }

    /// Read-only restock suggestion for the API.
    pub fn suggestion(product: &Product, lead_time_days: i64) -> SuggestedRestockView {
        SuggestedRestockView {
            product_id: product.id_string(),
            product_name: product.name.clone(),
            category: product.category_ref(),
            current_inventory: product.inventory,
            daily_sales_avg: product.daily_sales_avg,
            lead_time_days,
            suggested_qty: Self::suggested_restock_qty(product, lead_time_days),
            days_left: Self::days_left(product),
            min_threshold: product.min_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::db::models::Sale;
    use crate::db::repository::ProductRepository;
    use rust_decimal::Decimal;
    use shared::models::BillingStatus;
    use shared::util::DAY_MS;

    fn product_with(inventory: i64, avg: f64) -> Product {
        Product {
            id: None,
            owner: "user1".into(),
            name: "Beans".into(),
            unit_price: Decimal::new(1050, 2),
            unit_cost: Decimal::ZERO,
            inventory,
            min_threshold: 10,
            daily_sales_avg: avg,
            last_sold_at: None,
            category: None,
            category_name: None,
            created_at: 0,
        }
    }

    async fn seed_sale(db: &Surreal<Db>, product: &RecordId, qty: i64, sold_at: i64) {
        SaleRepository::new(db.clone())
            .create(Sale {
                id: None,
                owner: "user1".into(),
                customer_name: "Ada".into(),
                customer_email: "ada@example.com".into(),
                product: product.clone(),
                product_name: "Beans".into(),
                quantity: qty,
                unit_price: Decimal::ONE,
                unit_cost: Decimal::ZERO,
                amount: Decimal::from(qty),
                sold_at,
                billing_status: BillingStatus::Generated,
                billing_attempts: 0,
                next_billing_attempt_at: None,
                receipt_ref: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn recompute_is_idempotent_over_full_history() {
        let db = init_memory_database().await.unwrap();
        let products = ProductRepository::new(db.clone());
        let product = products
            .create(crate::db::models::ProductCreate {
                owner: "user1".into(),
                name: "Beans".into(),
                unit_price: Decimal::ONE,
                unit_cost: Decimal::ZERO,
                inventory: 100,
                min_threshold: None,
                category: None,
                category_name: None,
            })
            .await
            .unwrap();
        let id = product.id.clone().unwrap();

        // 10 units over the last two days (with a minute of margin so the
        // elapsed-day count cannot roll over between the two recomputes).
        let now = now_millis();
        seed_sale(&db, &id, 4, now - 2 * DAY_MS + 60_000).await;
        seed_sale(&db, &id, 6, now - DAY_MS).await;

        let engine = ForecastEngine::new(db.clone());
        let first = engine.recompute(&id).await.unwrap();
        let second = engine.recompute(&id).await.unwrap();
        assert_eq!(first, second);
        assert!((first - 5.0).abs() < 0.01, "expected ~5/day, got {first}");

        let stored = products.find_by_id(&id).await.unwrap().unwrap();
        assert!((stored.daily_sales_avg - first).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn no_history_means_zero_signal() {
        let db = init_memory_database().await.unwrap();
        let products = ProductRepository::new(db.clone());
        let product = products
            .create(crate::db::models::ProductCreate {
                owner: "user1".into(),
                name: "Beans".into(),
                unit_price: Decimal::ONE,
                unit_cost: Decimal::ZERO,
                inventory: 100,
                min_threshold: None,
                category: None,
                category_name: None,
            })
            .await
            .unwrap();
        let id = product.id.clone().unwrap();

        let engine = ForecastEngine::new(db);
        assert_eq!(engine.recompute(&id).await.unwrap(), 0.0);
    }

    #[test]
    fn sales_within_the_first_day_count_as_one_day() {
        // ceil + clamp: an hour of history divides by 1, not 0.
        assert_eq!(days_elapsed_at_least_one(0, 3_600_000), 1);
    }

    #[test]
    fn depletion_and_suggestion_math() {
        let p = product_with(12, 4.0);
        assert_eq!(ForecastEngine::days_left(&p), Some(3.0));
        assert!(ForecastEngine::depletes_soon(&p));
        assert_eq!(ForecastEngine::suggested_restock_qty(&p, 7), 28);

        let idle = product_with(12, 0.0);
        assert_eq!(ForecastEngine::days_left(&idle), None);
        assert!(!ForecastEngine::depletes_soon(&idle));
        assert_eq!(ForecastEngine::suggested_restock_qty(&idle, 7), 0);

        // 2.5/day over 3 days rounds up to a whole order.
        let busy = product_with(100, 2.5);
        assert_eq!(ForecastEngine::suggested_restock_qty(&busy, 3), 8);
        assert!(!ForecastEngine::depletes_soon(&busy));
    }

    #[test]
    fn suggestion_resolves_the_category() {
        use shared::models::CategoryRef;

        let mut p = product_with(12, 4.0);
        p.category_name = Some("Pantry".into());
        let view = ForecastEngine::suggestion(&p, 7);
        assert_eq!(
            view.category,
            CategoryRef::LegacyNameOnly {
                name: "Pantry".into()
            }
        );
        assert_eq!(view.suggested_qty, 28);
    }

    #[test]
    fn warning_boundary_is_six_days() {
        // Exactly 6 days left fires; anything past 6 does not.
        let at_boundary = product_with(12, 2.0);
        assert_eq!(ForecastEngine::days_left(&at_boundary), Some(6.0));
        assert!(ForecastEngine::depletes_soon(&at_boundary));

        let just_past = product_with(13, 2.0);
        assert_eq!(ForecastEngine::days_left(&just_past), Some(6.5));
        assert!(!ForecastEngine::depletes_soon(&just_past));
    }
}
