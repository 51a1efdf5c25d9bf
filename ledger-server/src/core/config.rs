use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// Every knob can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/ledger | Working directory (database, receipts, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | MAIL_API_URL | (empty) | HTTP mail-API endpoint; empty disables dispatch |
/// | MAIL_FROM | receipts@ledger.local | Sender address on outgoing receipts |
/// | MAIL_TIMEOUT_MS | 10000 | Per-call timeout for mail dispatch |
/// | BILLING_MAX_ATTEMPTS | 5 | Retry budget before a sale is dead-lettered |
/// | BILLING_RETRY_BATCH | 10 | Max failed sales picked up per retry sweep |
/// | BILLING_RETRY_INTERVAL_MS | 3600000 | Retry sweep interval (hourly) |
/// | MAINTENANCE_INTERVAL_MS | 86400000 | Forecast/alert sweep interval (daily) |
/// | LEAD_TIME_DAYS | 7 | Default supplier lead time for restock suggestions |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/ledger HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding database files, receipt documents and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Billing pipeline ===
    /// Mail-API endpoint for receipt dispatch. Empty string disables dispatch.
    pub mail_api_url: String,
    /// Sender address on outgoing receipt mail
    pub mail_from: String,
    /// Per-call timeout for mail dispatch (milliseconds)
    pub mail_timeout_ms: u64,
    /// Retry budget: FAILED sales flip to ABANDONED at this attempt count
    pub billing_max_attempts: u32,
    /// Maximum failed sales picked up per retry sweep
    pub billing_retry_batch: usize,
    /// Billing retry sweep interval (milliseconds)
    pub billing_retry_interval_ms: u64,

    // === Maintenance ===
    /// Forecast recompute / alert scan interval (milliseconds)
    pub maintenance_interval_ms: u64,
    /// Default supplier lead time used for restock suggestions (days)
    pub lead_time_days: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/ledger".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            mail_api_url: std::env::var("MAIL_API_URL").unwrap_or_default(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "receipts@ledger.local".into()),
            mail_timeout_ms: std::env::var("MAIL_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            billing_max_attempts: std::env::var("BILLING_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            billing_retry_batch: std::env::var("BILLING_RETRY_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            billing_retry_interval_ms: std::env::var("BILLING_RETRY_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3_600_000),

            maintenance_interval_ms: std::env::var("MAINTENANCE_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400_000),
            lead_time_days: std::env::var("LEAD_TIME_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
        }
    }

    /// Override work_dir and port, keeping everything else from the
    /// environment. Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// `work_dir/database` — embedded database files
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// `work_dir/receipts` — durable receipt documents
    pub fn receipts_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("receipts")
    }

    /// Create the work_dir subdirectory layout if missing.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.receipts_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
