//! Sales API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sales", sale_routes())
}

fn sale_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}/receipt", get(handler::receipt))
}
