//! Sale model
//!
//! One record per committed line. Price and cost are snapshotted at
//! commit time so later catalog edits never rewrite history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{BillingStatus, SaleView};
use shared::util::format_date;
use surrealdb::RecordId;

/// A committed sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub owner: String,
    pub customer_name: String,
    pub customer_email: String,
    pub product: RecordId,
    /// Product name at commit time
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
    /// Exactly `unit_price * quantity`
    pub amount: Decimal,
    pub sold_at: i64,
    pub billing_status: BillingStatus,
    #[serde(default)]
    pub billing_attempts: u32,
    /// Backoff deadline for the next retry; FAILED lines only
    #[serde(default)]
    pub next_billing_attempt_at: Option<i64>,
    /// Durable receipt reference once GENERATED
    #[serde(default)]
    pub receipt_ref: Option<String>,
}

impl Sale {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

impl From<Sale> for SaleView {
    fn from(s: Sale) -> Self {
        SaleView {
            id: s.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            customer_name: s.customer_name,
            customer_email: s.customer_email,
            product_id: s.product.to_string(),
            product_name: s.product_name,
            quantity: s.quantity,
            unit_price: s.unit_price,
            amount: s.amount,
            date: format_date(s.sold_at),
            billing_status: s.billing_status,
            receipt_ref: s.receipt_ref,
        }
    }
}
