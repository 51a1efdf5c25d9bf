//! Notification model

use serde::{Deserialize, Serialize};
use shared::models::{NotificationKind, NotificationView};
use surrealdb::RecordId;

/// An operator alert. Never deleted; only its read flag changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Owning operator (external user id)
    pub user: String,
    /// Product the alert refers to; absent for SYSTEM messages
    #[serde(default)]
    pub product: Option<RecordId>,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        NotificationView {
            id: n.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            product_id: n.product.as_ref().map(|p| p.to_string()),
            kind: n.kind,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}
