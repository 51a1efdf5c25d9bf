//! Restock API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{RestockEvent, RestockSource};
use crate::db::repository::{ProductRepository, RestockRepository};
use crate::forecast::ForecastEngine;
use crate::sales::flatten_validation_errors;
use shared::models::{AuditAction, EntityKind, RestockEventView, RestockRequest, SuggestedRestockView};
use shared::util::now_millis;
use shared::{AppError, AppResult};

/// Payload returned after a restock: the recorded event plus the
/// product's new inventory level.
#[derive(Debug, Serialize)]
pub struct RestockResponse {
    pub event: RestockEventView,
    pub inventory: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeadTimeQuery {
    pub lead_time: Option<i64>,
}

/// POST /api/restock - add inventory and record the event
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(request): Json<RestockRequest>,
) -> AppResult<Json<RestockResponse>> {
    request
        .validate()
        .map_err(|e| AppError::validation(flatten_validation_errors(&e)))?;

    let products = ProductRepository::new(state.db.clone());
    let product_id = ProductRepository::id_of(&request.product_id);
    let before = products
        .find_owned(&product_id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", request.product_id)))?;

    let after = products.add_inventory(&product_id, request.quantity).await?;

    let restocks = RestockRepository::new(state.db.clone());
    let event = restocks
        .create(RestockEvent {
            id: None,
            product: product_id,
            quantity_added: request.quantity,
            restocked_by: user.id.clone(),
            restocked_at: now_millis(),
            supplier_name: request.supplier_name,
            cost_price: request.cost_price,
            source: RestockSource::Restock,
        })
        .await?;

    state.audit.record(
        &user.id,
        AuditAction::Restock,
        EntityKind::Inventory,
        &after.id_string(),
        Some(serde_json::json!({ "inventory": before.inventory })),
        Some(serde_json::json!({ "inventory": after.inventory })),
    );

    Ok(Json(RestockResponse {
        event: RestockEventView::from(event),
        inventory: after.inventory,
    }))
}

/// GET /api/restock/history/{product_id} - recent additions, newest first
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<Vec<RestockEventView>>> {
    let products = ProductRepository::new(state.db.clone());
    let id = ProductRepository::id_of(&product_id);
    products
        .find_owned(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;

    let restocks = RestockRepository::new(state.db.clone());
    let events = restocks.history_for_product(&id).await?;
    Ok(Json(events.into_iter().map(RestockEventView::from).collect()))
}

/// GET /api/restock/suggested/{product_id}?lead_time=7
///
/// Falls back to the configured lead time when the query parameter is
/// absent or non-positive.
pub async fn suggested(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    Query(query): Query<LeadTimeQuery>,
) -> AppResult<Json<SuggestedRestockView>> {
    let products = ProductRepository::new(state.db.clone());
    let id = ProductRepository::id_of(&product_id);
    let product = products
        .find_owned(&id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;

    let lead_time = match query.lead_time {
        Some(days) if days > 0 => days,
        _ => state.config.lead_time_days,
    };

    Ok(Json(ForecastEngine::suggestion(&product, lead_time)))
}
