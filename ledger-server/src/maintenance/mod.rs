//! Scheduled maintenance
//!
//! Fixed-interval background sweeps, independent of live traffic:
//!
//! - maintenance sweep (default daily): forecast recompute for every
//!   product, then dead-stock, forecast-warning and restock-reminder
//!   scans
//! - billing retry sweep (default hourly): re-run failed receipt
//!   generation in bounded batches
//!
//! Every job is idempotent, takes no locks, and treats per-product
//! failures as log lines so one bad record never stalls a sweep.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::ServerState;
use crate::db::repository::ProductRepository;
use crate::forecast::ForecastEngine;
use crate::notify::NotificationEngine;
use shared::util::now_millis;

#[derive(Clone)]
pub struct MaintenanceRunner {
    state: ServerState,
}

impl MaintenanceRunner {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Periodic loop: run the full maintenance sweep until shutdown.
    pub async fn run_maintenance_loop(self, shutdown: CancellationToken) {
        let interval = Duration::from_millis(self.state.config.maintenance_interval_ms);
        tracing::info!(interval_ms = interval.as_millis() as u64, "Maintenance loop started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.run_maintenance_sweep().await;
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Maintenance loop stopping");
                    return;
                }
            }
        }
    }

    /// Periodic loop: billing retry sweep until shutdown.
    pub async fn run_billing_retry_loop(self, shutdown: CancellationToken) {
        let interval = Duration::from_millis(self.state.config.billing_retry_interval_ms);
        tracing::info!(interval_ms = interval.as_millis() as u64, "Billing retry loop started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let attempted = self
                        .state
                        .billing
                        .retry_batch(self.state.config.billing_retry_batch)
                        .await;
                    if attempted > 0 {
                        tracing::info!(attempted, "Billing retry sweep finished");
                    }
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Billing retry loop stopping");
                    return;
                }
            }
        }
    }

    /// One full sweep over the whole catalog. Public so tests (and a
    /// future admin trigger) can run it on demand.
    pub async fn run_maintenance_sweep(&self) {
        let started = now_millis();

        let products = ProductRepository::new(self.state.db.clone());
        let forecast = ForecastEngine::new(self.state.db.clone());
        let notify = NotificationEngine::new(self.state.db.clone());
        let lead_time = self.state.config.lead_time_days;

        let all = match products.find_all().await {
            Ok(all) => all,
            Err(e) => {
                tracing::error!(error = %e, "Maintenance sweep could not list products");
                return;
            }
        };

        let mut recomputed = 0usize;
        for product in &all {
            let Some(id) = product.id.as_ref() else { continue };
            match forecast.recompute(id).await {
                Ok(_) => recomputed += 1,
                Err(e) => {
                    tracing::warn!(product = %id, error = %e, "Forecast recompute failed");
                }
            }
        }

        // Re-read so the alert rules see the fresh averages.
        let all = match products.find_all().await {
            Ok(all) => all,
            Err(e) => {
                tracing::error!(error = %e, "Maintenance sweep could not re-list products");
                return;
            }
        };

        let now = now_millis();
        let mut alerts = 0usize;
        for product in &all {
            if notify.check_dead_stock(product, now).await {
                alerts += 1;
            }
            if product.daily_sales_avg > 0.0 && notify.check_forecast_warning(product).await {
                alerts += 1;
            }
            if notify.check_restock_reminder(product, lead_time).await {
                alerts += 1;
            }
        }

        tracing::info!(
            products = all.len(),
            recomputed,
            alerts,
            elapsed_ms = now_millis() - started,
            "Maintenance sweep finished"
        );
    }
}
