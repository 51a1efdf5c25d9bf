//! Product model
//!
//! Catalog CRUD lives upstream; this service reads products and mutates
//! only their inventory-facing fields (inventory, last_sold_at,
//! daily_sales_avg).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::CategoryRef;
use surrealdb::RecordId;

/// A stocked item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<RecordId>,
    /// External owner (store operator) id
    pub owner: String,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
    /// Units on hand; never negative
    pub inventory: i64,
    /// Low-stock alert threshold
    #[serde(default = "default_min_threshold")]
    pub min_threshold: i64,
    /// Rolling demand estimate, units per day
    #[serde(default)]
    pub daily_sales_avg: f64,
    #[serde(default)]
    pub last_sold_at: Option<i64>,
    /// Normalized category link
    #[serde(default)]
    pub category: Option<RecordId>,
    /// Legacy free-text category, kept until backfilled
    #[serde(default)]
    pub category_name: Option<String>,
    pub created_at: i64,
}

fn default_min_threshold() -> i64 {
    10
}

impl Product {
    /// `table:key` form of the record id, empty before creation.
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Resolve the category through the explicit dual-path rule.
    pub fn category_ref(&self) -> CategoryRef {
        let reference = self.category.as_ref().map(|c| c.to_string());
        CategoryRef::resolve(reference.as_deref(), self.category_name.as_deref())
    }
}

/// Creation payload, used when seeding the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub owner: String,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
    pub inventory: i64,
    #[serde(default)]
    pub min_threshold: Option<i64>,
    #[serde(default)]
    pub category: Option<RecordId>,
    #[serde(default)]
    pub category_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_resolution_prefers_the_link() {
        let product = Product {
            id: None,
            owner: "user-1".into(),
            name: "Beans".into(),
            unit_price: Decimal::new(599, 2),
            unit_cost: Decimal::ZERO,
            inventory: 10,
            min_threshold: 10,
            daily_sales_avg: 0.0,
            last_sold_at: None,
            category: Some(RecordId::from_table_key("category", "grocery")),
            category_name: Some("Pantry".into()),
            created_at: 0,
        };
        assert_eq!(
            product.category_ref(),
            CategoryRef::Resolved {
                reference: "category:grocery".into()
            }
        );
    }
}
