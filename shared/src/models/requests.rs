//! Request DTOs for the ledger API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One requested line of a sale: a product and how many units.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaleLineRequest {
    #[validate(length(min = 1, message = "product_id is required"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
}

/// Body of `POST /api/sales`.
///
/// Lines sharing the request share customer and time but commit as
/// independent Sale records.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSaleRequest {
    #[validate(length(min = 1, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(email(message = "customer_email must be a valid email"))]
    pub customer_email: String,
    #[validate(length(min = 1, message = "at least one line is required"))]
    #[validate(nested)]
    pub lines: Vec<SaleLineRequest>,
}

/// Body of `POST /api/restock`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestockRequest {
    #[validate(length(min = 1, message = "product_id is required"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
}
