//! Notification kinds and per-user alert preferences

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of operator alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Inventory at or below the product's minimum threshold
    LowStock,
    /// Forecast predicts depletion within the warning horizon
    ForecastWarning,
    /// Sellable inventory with no sales activity past the grace period
    DeadStock,
    /// Maintenance scan suggests a restock order
    RestockReminder,
    /// Operator-facing system message
    System,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LowStock => "LOW_STOCK",
            Self::ForecastWarning => "FORECAST_WARNING",
            Self::DeadStock => "DEAD_STOCK",
            Self::RestockReminder => "RESTOCK_REMINDER",
            Self::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

/// Per-user notification preference flags.
///
/// A missing profile means every alert is enabled; each rule consults its
/// own flag independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPrefs {
    #[serde(default = "default_true")]
    pub low_stock_alerts: bool,
    #[serde(default = "default_true")]
    pub forecast_alerts: bool,
    #[serde(default = "default_true")]
    pub dead_stock_alerts: bool,
    #[serde(default = "default_true")]
    pub restock_reminders: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            low_stock_alerts: true,
            forecast_alerts: true,
            dead_stock_alerts: true,
            restock_reminders: true,
        }
    }
}

impl NotificationPrefs {
    /// Whether alerts of `kind` are enabled for this user.
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::LowStock => self.low_stock_alerts,
            NotificationKind::ForecastWarning => self.forecast_alerts,
            NotificationKind::DeadStock => self.dead_stock_alerts,
            NotificationKind::RestockReminder => self.restock_reminders,
            NotificationKind::System => true,
        }
    }
}
