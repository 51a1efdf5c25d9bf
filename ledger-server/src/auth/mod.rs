//! Request identity
//!
//! Authentication happens upstream; the gateway forwards the verified
//! operator id in the `x-user-id` header. The extractor turns that header
//! into a [`CurrentUser`], rejecting requests that arrive without one.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::core::ServerState;

/// Header carrying the verified operator id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated operator on the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// External user id, as the gateway verified it
    pub id: String,
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse an identity another extractor already resolved.
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty());

        match id {
            Some(id) => {
                let user = CurrentUser { id: id.to_string() };
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            None => {
                tracing::warn!(uri = %parts.uri, "Request without identity header");
                Err(AppError::unauthorized())
            }
        }
    }
}
