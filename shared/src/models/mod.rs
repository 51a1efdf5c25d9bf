//! Domain vocabulary shared between the server and its clients
//!
//! Closed enums for every state marker (billing status, notification kind,
//! audit action) — free-form strings are not accepted anywhere.

mod audit;
mod billing_status;
mod category;
mod notification;
mod requests;
mod views;

pub use audit::{AuditAction, EntityKind};
pub use billing_status::BillingStatus;
pub use category::CategoryRef;
pub use notification::{NotificationKind, NotificationPrefs};
pub use requests::{CreateSaleRequest, RestockRequest, SaleLineRequest};
pub use views::{
    AuditLogView, NotificationView, RestockEventView, SaleView, SuggestedRestockView,
    UnreadCountView,
};
