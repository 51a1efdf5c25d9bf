//! Background task registry
//!
//! Registers, supervises and shuts down the server's long-running tasks:
//! the audit worker and the periodic maintenance sweeps. Every task is
//! wrapped to catch panics so a crashing job never takes the process down
//! silently.

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Task flavor, for logs and supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Long-lived worker draining a channel (exits when the channel closes)
    Worker,
    /// Fixed-interval job (exits on shutdown)
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "Worker"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Background task manager.
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn("audit_worker", TaskKind::Worker, async move { /* ... */ });
/// let token = tasks.shutdown_token();
/// // later:
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token the tasks watch for the shutdown signal.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Register and start a background task.
    ///
    /// The future is wrapped to catch panics; an abnormal exit is logged
    /// with the panic payload.
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    tracing::debug!(task = %name, kind = %kind, "Background task completed");
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked"
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        let workers = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Worker)
            .count();
        let periodic = self.tasks.len() - workers;
        tracing::info!(
            "Background tasks registered: {} total (Worker: {}, Periodic: {})",
            self.tasks.len(),
            workers,
            periodic
        );
    }

    /// Cancel every task and wait for all of them to finish.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());

        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => {
                    tracing::debug!(task = %task.name, "Task stopped");
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(task = %task.name, "Task cancelled");
                }
                Err(e) => {
                    tracing::error!(task = %task.name, error = ?e, "Task panicked");
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
