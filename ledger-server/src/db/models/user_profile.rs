//! Operator profile model
//!
//! Identity lives upstream; this table only keeps the per-operator
//! notification preferences and counters, keyed by the external user id.

use serde::{Deserialize, Serialize};
use shared::models::NotificationPrefs;
use surrealdb::RecordId;

/// Aggregate counters kept on the profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_sales_created: i64,
}

/// Per-operator settings and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub notification_prefs: NotificationPrefs,
    #[serde(default)]
    pub stats: UserStats,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            id: None,
            notification_prefs: NotificationPrefs::default(),
            stats: UserStats::default(),
        }
    }
}
