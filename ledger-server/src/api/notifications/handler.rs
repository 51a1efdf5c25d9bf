//! Notifications API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::NotificationRepository;
use shared::models::{NotificationView, UnreadCountView};
use shared::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub unread_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

/// GET /api/notifications - the operator's feed, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<NotificationView>>> {
    let repo = NotificationRepository::new(state.db.clone());
    let unread_only = query.unread_only.unwrap_or(false);
    let notifications = repo.list_for_user(&user.id, unread_only).await?;
    Ok(Json(
        notifications.into_iter().map(NotificationView::from).collect(),
    ))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCountView>> {
    let repo = NotificationRepository::new(state.db.clone());
    let unread = repo.unread_count(&user.id).await?;
    Ok(Json(UnreadCountView { unread }))
}

/// PUT /api/notifications/{id}/read
///
/// Scoped to the caller; marking another operator's notification (or a
/// missing one) is a plain 404.
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<NotificationView>> {
    let repo = NotificationRepository::new(state.db.clone());
    let record_id = NotificationRepository::id_of(&id);
    let notification = repo
        .mark_read(&record_id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {id}")))?;
    Ok(Json(NotificationView::from(notification)))
}

/// PUT /api/notifications/read-all - idempotent, reports how many flipped
pub async fn mark_all_read(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let repo = NotificationRepository::new(state.db.clone());
    let marked = repo.mark_all_read(&user.id).await?;
    Ok(Json(MarkAllReadResponse { marked }))
}
