//! Notifications API
//!
//! Listing, unread counts, and read-state transitions for the operator's
//! notification feed.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", notification_routes())
}

fn notification_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/unread-count", get(handler::unread_count))
        .route("/{id}/read", put(handler::mark_read))
        .route("/read-all", put(handler::mark_all_read))
}
