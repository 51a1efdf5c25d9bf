use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use crate::audit::{AuditEvent, AuditRecorder, AuditWorker};
use crate::billing::{BillingPipeline, FsObjectStore, HttpMailer, LogMailer, Mailer, ObjectStore};
use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::maintenance::MaintenanceRunner;
use crate::sales::ProductLocks;

/// Application context — one instance per process, cloned into every
/// handler and background task.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | Immutable configuration |
/// | db | Surreal<Db> | Embedded database |
/// | audit | Arc<AuditRecorder> | Fire-and-forget audit trail |
/// | billing | Arc<BillingPipeline> | Receipt generation and retry |
/// | product_locks | Arc<ProductLocks> | Per-product mutual exclusion |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Audit trail recorder (mpsc producer + query side)
    pub audit: Arc<AuditRecorder>,
    /// Receipt pipeline (render, persist, dispatch, retry)
    pub billing: Arc<BillingPipeline>,
    /// Per-product async lock registry for the sale pipeline
    pub product_locks: Arc<ProductLocks>,

    /// Consumer end of the audit channel, handed to the worker on
    /// `start_background_tasks`. Present exactly once.
    audit_rx: Arc<std::sync::Mutex<Option<mpsc::Receiver<AuditEvent>>>>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Initialize the full application context.
    ///
    /// Order: work_dir layout → database (work_dir/database) → receipt
    /// store → mailer → pipeline services.
    ///
    /// # Panics
    ///
    /// Panics when the work directory or the database cannot be opened;
    /// the process is useless without either.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db = crate::db::init_database(&config.database_dir())
            .await
            .expect("Failed to initialize database");

        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(config.receipts_dir()));

        // An empty MAIL_API_URL means no gateway is configured; receipts
        // are still rendered and persisted, dispatch is logged only.
        let mailer: Arc<dyn Mailer> = if config.mail_api_url.is_empty() {
            tracing::warn!("MAIL_API_URL not set, receipt dispatch will be logged only");
            Arc::new(LogMailer)
        } else {
            Arc::new(HttpMailer::new(
                config.mail_api_url.clone(),
                config.mail_timeout_ms,
            ))
        };

        Self::initialize_with(config.clone(), db, store, mailer)
    }

    /// Build the context from pre-constructed collaborators.
    ///
    /// Production goes through [`initialize`]; tests inject an in-memory
    /// database and scripted store/mailer doubles here.
    pub fn initialize_with(
        config: Config,
        db: Surreal<Db>,
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let (audit, audit_rx) = AuditRecorder::new(db.clone(), 256);
        let billing = Arc::new(BillingPipeline::new(
            db.clone(),
            store,
            mailer,
            config.mail_from.clone(),
            config.billing_max_attempts,
        ));

        Self {
            config,
            db,
            audit,
            billing,
            product_locks: Arc::new(ProductLocks::new()),
            audit_rx: Arc::new(std::sync::Mutex::new(Some(audit_rx))),
        }
    }

    /// Register and start all background tasks.
    ///
    /// Must be called exactly once, before `Server::run` starts serving:
    /// - the audit worker draining the mpsc channel
    /// - the periodic maintenance sweeps (forecast + alerts)
    /// - the periodic billing retry sweep
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        if let Some(rx) = self
            .audit_rx
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
        {
            let worker = AuditWorker::new(self.db.clone());
            tasks.spawn("audit_worker", TaskKind::Worker, worker.run(rx));
        } else {
            tracing::warn!("Audit worker already started, skipping registration");
        }

        let runner = MaintenanceRunner::new(self.clone());
        let token = tasks.shutdown_token();
        tasks.spawn(
            "maintenance_sweep",
            TaskKind::Periodic,
            runner.clone().run_maintenance_loop(token),
        );
        let token = tasks.shutdown_token();
        tasks.spawn(
            "billing_retry",
            TaskKind::Periodic,
            runner.run_billing_retry_loop(token),
        );

        tasks.log_summary();
        tasks
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
