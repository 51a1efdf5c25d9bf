//! Restock event model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::RestockEventView;
use surrealdb::RecordId;

/// How the inventory addition came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestockSource {
    /// Explicit restock through the API
    Restock,
    /// Opening stock recorded when the product entered the catalog
    Initial,
}

/// One inventory addition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockEvent {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub product: RecordId,
    pub quantity_added: i64,
    /// Operator who restocked
    pub restocked_by: String,
    pub restocked_at: i64,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    pub source: RestockSource,
}

impl From<RestockEvent> for RestockEventView {
    fn from(e: RestockEvent) -> Self {
        RestockEventView {
            id: e.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            product_id: e.product.to_string(),
            quantity_added: e.quantity_added,
            restocked_by: e.restocked_by,
            restocked_at: e.restocked_at,
            supplier_name: e.supplier_name,
            cost_price: e.cost_price,
        }
    }
}
