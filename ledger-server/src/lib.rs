//! Ledger Server
//!
//! Small-business inventory-and-sales ledger: records sale transactions
//! against stocked items, keeps inventory counts consistent, forecasts
//! depletion, raises operator alerts, and produces a durable receipt
//! document per transaction.
//!
//! # Module map
//!
//! - [`core`] — configuration, application state, HTTP server, background tasks
//! - [`db`] — embedded SurrealDB and per-entity repositories
//! - [`sales`] — the sale transaction coordinator
//! - [`forecast`] — rolling daily-sales-average and depletion forecasting
//! - [`notify`] — rule-based, deduplicated operator alerts
//! - [`audit`] — append-only, best-effort audit trail
//! - [`billing`] — receipt rendering, durable storage, dispatch, retry
//! - [`maintenance`] — fixed-schedule batch jobs
//! - [`api`] — HTTP routes and handlers

pub mod api;
pub mod audit;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod forecast;
pub mod maintenance;
pub mod notify;
pub mod sales;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use shared::{AppError, AppResult};

/// Load `.env` and initialize logging. Called once at startup.
pub fn setup_environment() -> anyhow::Result<()> {
    // A missing .env file is fine; env vars may come from the environment.
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

/// Startup banner.
pub fn print_banner() {
    println!(
        r#"
  _          _                     ____
 | | ___  __| | __ _  ___ _ __    / ___|  ___ _ ____   _____ _ __
 | |/ _ \/ _` |/ _` |/ _ \ '__|___\___ \ / _ \ '__\ \ / / _ \ '__|
 | |  __/ (_| | (_| |  __/ | |_____|__) |  __/ |   \ V /  __/ |
 |_|\___|\__,_|\__, |\___|_|      |____/ \___|_|    \_/ \___|_|
               |___/        inventory & sales ledger
"#
    );
}
