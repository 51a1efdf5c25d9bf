//! HTTP server startup and graceful shutdown

use crate::api;
use crate::core::{Config, ServerState};

/// HTTP server.
///
/// Owns the listening socket; state is either injected (tests) or
/// initialized from the configuration on `run`.
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server over existing state (test harnesses build state
    /// themselves to inject collaborator doubles).
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        let tasks = state.start_background_tasks();

        let app = api::build_app().with_state(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Ledger server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        // HTTP side is down; stop the workers and flush the audit channel.
        tasks.shutdown().await;

        Ok(())
    }
}
