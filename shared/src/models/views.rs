//! Response DTOs for the ledger API
//!
//! Flat, string-id views of the persisted records. The server converts its
//! store records into these before serialization.

use super::{AuditAction, BillingStatus, CategoryRef, EntityKind, NotificationKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A committed sale line as returned by the sales API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleView {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub amount: Decimal,
    /// `YYYY-MM-DD` sale date
    pub date: String,
    pub billing_status: BillingStatus,
    /// Durable receipt reference, present once billing reached GENERATED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_ref: Option<String>,
}

/// An operator notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

/// Unread-count payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountView {
    pub unread: u64,
}

/// A restock event from the history query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockEventView {
    pub id: String,
    pub product_id: String,
    pub quantity_added: i64,
    pub restocked_by: String,
    pub restocked_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
}

/// Suggested restock quantity for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedRestockView {
    pub product_id: String,
    pub product_name: String,
    /// Category for the purchase order, resolved through the dual-path rule
    pub category: CategoryRef,
    pub current_inventory: i64,
    pub daily_sales_avg: f64,
    pub lead_time_days: i64,
    pub suggested_qty: i64,
    /// Days until depletion at the current rate; absent when there is no
    /// sales history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<f64>,
    pub min_threshold: i64,
}

/// One audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogView {
    pub id: String,
    pub user: String,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
    pub at: i64,
}
