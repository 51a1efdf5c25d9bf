//! Health API module

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    environment: String,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// GET /health - public liveness probe
async fn health(
    axum::extract::State(state): axum::extract::State<ServerState>,
) -> Json<Health> {
    Json(Health {
        status: "ok",
        environment: state.config.environment.clone(),
    })
}
