//! Logging infrastructure
//!
//! Structured logging via `tracing`, with optional daily-rolling file
//! output for long-running deployments.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `log_level` falls back to `RUST_LOG`, then to `info`. If `log_dir`
/// names an existing directory, a daily-rolling `ledger-server` log file
/// is written there instead of stderr.
pub fn init_logger(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "ledger-server");
            subscriber.with_writer(file_appender).with_ansi(false).init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stderr");
    }

    subscriber.init();
}
