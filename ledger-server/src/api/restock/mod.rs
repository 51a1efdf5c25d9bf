//! Restock API
//!
//! Inventory additions, per-product restock history, and forecast-driven
//! restock suggestions.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restock", restock_routes())
}

fn restock_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/history/{product_id}", get(handler::history))
        .route("/suggested/{product_id}", get(handler::suggested))
}
