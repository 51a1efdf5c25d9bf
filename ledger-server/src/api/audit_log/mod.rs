//! Audit log API
//!
//! Read-only queries against the audit trail, by entity or by operator.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/audit-log", audit_routes())
}

fn audit_routes() -> Router<ServerState> {
    Router::new()
        .route("/entity/{entity_type}/{entity_id}", get(handler::by_entity))
        .route("/me", get(handler::by_me))
}
