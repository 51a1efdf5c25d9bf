//! Operator notifications
//!
//! Rule evaluation and alert creation. Every entry point here is
//! fire-and-forget: a failed insert is logged and swallowed, never
//! surfaced to the operation that triggered the check. The observed
//! operation (sale commit, maintenance sweep) must not fail because an
//! alert could not be written.

use shared::models::{NotificationKind, NotificationPrefs};
use shared::util::DAY_MS;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Notification, Product};
use crate::db::repository::{NotificationRepository, UserRepository};
use crate::forecast::ForecastEngine;

/// A product with no sales for this long, and at least this old, is dead
/// stock.
pub const DEAD_STOCK_AGE_DAYS: i64 = 30;

/// Rolling dedup window for DEAD_STOCK alerts, regardless of read state.
pub const DEAD_STOCK_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct NotificationEngine {
    notifications: NotificationRepository,
    users: UserRepository,
}

impl NotificationEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            notifications: NotificationRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    async fn prefs(&self, user: &str) -> NotificationPrefs {
        match self.users.prefs_for(user).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "Failed to load notification prefs, assuming defaults");
                NotificationPrefs::default()
            }
        }
    }

    /// Insert an alert, swallowing any failure. Returns whether a record
    /// was actually written.
    async fn push(
        &self,
        user: &str,
        product: Option<&RecordId>,
        kind: NotificationKind,
        message: String,
    ) -> bool {
        let notification = Notification {
            id: None,
            user: user.to_string(),
            product: product.cloned(),
            kind,
            message,
            is_read: false,
            created_at: shared::util::now_millis(),
        };
        match self.notifications.create(notification).await {
            Ok(_) => {
                tracing::debug!(user = %user, kind = %kind, "Notification created");
                true
            }
            Err(e) => {
                tracing::warn!(user = %user, kind = %kind, error = %e, "Failed to create notification");
                false
            }
        }
    }

    /// LOW_STOCK: inventory at or below the product's threshold.
    /// Suppressed while an unread alert of the same kind exists.
    pub async fn check_low_stock(&self, product: &Product) -> bool {
        let Some(id) = product.id.as_ref() else {
            return false;
        };
        if product.inventory > product.min_threshold {
            return false;
        }
        if !self.prefs(&product.owner).await.allows(NotificationKind::LowStock) {
            return false;
        }
        match self
            .notifications
            .has_unread(&product.owner, id, NotificationKind::LowStock)
            .await
        {
            Ok(true) => return false,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Low-stock dedup check failed");
                return false;
            }
        }
        let message = format!(
            "\"{}\" is running low: {} units left (threshold {}).",
            product.name, product.inventory, product.min_threshold
        );
        self.push(&product.owner, Some(id), NotificationKind::LowStock, message)
            .await
    }

    /// FORECAST_WARNING: depletion predicted inside the warning horizon.
    /// Same unread-dedup as LOW_STOCK.
    pub async fn check_forecast_warning(&self, product: &Product) -> bool {
        let Some(id) = product.id.as_ref() else {
            return false;
        };
        let Some(days_left) = ForecastEngine::days_left(product) else {
            return false;
        };
        if !ForecastEngine::depletes_soon(product) {
            return false;
        }
        if !self
            .prefs(&product.owner)
            .await
            .allows(NotificationKind::ForecastWarning)
        {
            return false;
        }
        match self
            .notifications
            .has_unread(&product.owner, id, NotificationKind::ForecastWarning)
            .await
        {
            Ok(true) => return false,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Forecast-warning dedup check failed");
                return false;
            }
        }
        let message = format!(
            "\"{}\" is projected to run out in about {:.1} days at the current rate ({:.2}/day).",
            product.name, days_left, product.daily_sales_avg
        );
        self.push(
            &product.owner,
            Some(id),
            NotificationKind::ForecastWarning,
            message,
        )
        .await
    }

    /// DEAD_STOCK: sellable inventory with no sales activity for 30 days
    /// on a product at least 30 days old. Deduplicated by a 7-day rolling
    /// window on creation time, read or not.
    pub async fn check_dead_stock(&self, product: &Product, now: i64) -> bool {
        let Some(id) = product.id.as_ref() else {
            return false;
        };
        if product.inventory <= 0 {
            return false;
        }
        let stale_cutoff = now - DEAD_STOCK_AGE_DAYS * DAY_MS;
        let never_or_stale = match product.last_sold_at {
            None => true,
            Some(last) => last < stale_cutoff,
        };
        if !never_or_stale || product.created_at >= stale_cutoff {
            return false;
        }
        if !self
            .prefs(&product.owner)
            .await
            .allows(NotificationKind::DeadStock)
        {
            return false;
        }
        let window_start = now - DEAD_STOCK_WINDOW_DAYS * DAY_MS;
        match self
            .notifications
            .has_since(&product.owner, id, NotificationKind::DeadStock, window_start)
            .await
        {
            Ok(true) => return false,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Dead-stock dedup check failed");
                return false;
            }
        }
        let message = format!(
            "\"{}\" has not sold in over {} days but still has {} units in stock.",
            product.name, DEAD_STOCK_AGE_DAYS, product.inventory
        );
        self.push(&product.owner, Some(id), NotificationKind::DeadStock, message)
            .await
    }

    /// RESTOCK_REMINDER: for a product at or below its threshold, the
    /// maintenance sweep suggests an order quantity ahead of demand; with
    /// no demand signal it falls back to the plain low-stock rule.
    pub async fn check_restock_reminder(&self, product: &Product, lead_time_days: i64) -> bool {
        let Some(id) = product.id.as_ref() else {
            return false;
        };
        if product.inventory > product.min_threshold {
            return false;
        }
        let suggested = ForecastEngine::suggested_restock_qty(product, lead_time_days);
        if suggested <= 0 {
            return self.check_low_stock(product).await;
        }
        if !self
            .prefs(&product.owner)
            .await
            .allows(NotificationKind::RestockReminder)
        {
            return false;
        }
        let message = format!(
            "Consider restocking \"{}\": about {} units needed to cover the next {} days.",
            product.name, suggested, lead_time_days
        );
        self.push(
            &product.owner,
            Some(id),
            NotificationKind::RestockReminder,
            message,
        )
        .await
    }
}
