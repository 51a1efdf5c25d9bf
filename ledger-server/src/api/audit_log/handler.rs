//! Audit log API handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::models::{AuditLogView, EntityKind};
use shared::{AppError, AppResult};

/// GET /api/audit-log/entity/{entity_type}/{entity_id}
///
/// `entity_type` is the snake_case kind name (product, sale, profile,
/// inventory). Unknown kinds are a 400, not an empty list.
pub async fn by_entity(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> AppResult<Json<Vec<AuditLogView>>> {
    let kind = EntityKind::parse(&entity_type)
        .ok_or_else(|| AppError::invalid_request(format!("Unknown entity type: {entity_type}")))?;
    let entries = state.audit.list_for_entity(kind, &entity_id).await?;
    Ok(Json(entries))
}

/// GET /api/audit-log/me - the caller's own recorded actions
pub async fn by_me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<AuditLogView>>> {
    let entries = state.audit.list_for_user(&user.id).await?;
    Ok(Json(entries))
}
