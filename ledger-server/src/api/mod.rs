//! API route modules
//!
//! # Structure
//!
//! - [`health`] — public liveness probe
//! - [`sales`] — sale pipeline and receipts
//! - [`restock`] — inventory additions, history, suggestions
//! - [`notifications`] — operator alert queries and read-state
//! - [`audit_log`] — audit trail queries
//!
//! Every route except `/health` resolves a `CurrentUser` from the
//! gateway identity header.

pub mod audit_log;
pub mod health;
pub mod notifications;
pub mod restock;
pub mod sales;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Request ID generator.
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state).
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(sales::router())
        .merge(restock::router())
        .merge(notifications::router())
        .merge(audit_log::router())
        .merge(health::router())
}

/// Build the fully configured application with the middleware stack.
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Trace - request logging at INFO level
        .layer(TraceLayer::new_for_http())
        // Request ID - generate and propagate a unique id per request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
