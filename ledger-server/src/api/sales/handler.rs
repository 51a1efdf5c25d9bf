//! Sales API handlers

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::SaleRepository;
use crate::sales::SaleTransactionCoordinator;
use shared::models::{CreateSaleRequest, SaleView};
use shared::{AppError, AppResult, ErrorCode};

/// POST /api/sales - run the sale pipeline for one request
///
/// 200 with the committed lines (each carrying its billing status)
/// regardless of billing outcome; 400 with one joined error string when
/// validation rejects.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(request): Json<CreateSaleRequest>,
) -> AppResult<Json<Vec<SaleView>>> {
    let coordinator = SaleTransactionCoordinator::new(state);
    let views = coordinator.create_sale(&user.id, request).await?;
    Ok(Json(views))
}

/// GET /api/sales - the operator's sales, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<SaleView>>> {
    let repo = SaleRepository::new(state.db.clone());
    let sales = repo.list_for_owner(&user.id).await?;
    Ok(Json(sales.into_iter().map(SaleView::from).collect()))
}

/// GET /api/sales/{id}/receipt - serve the durable receipt document
///
/// 404 until billing recorded a durable reference for the sale.
pub async fn receipt(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let repo = SaleRepository::new(state.db.clone());
    let sale_id = SaleRepository::id_of(&id);
    let sale = repo
        .find_owned(&sale_id, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {id}")))?;

    let reference = sale.receipt_ref.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ReceiptNotAvailable,
            format!("No receipt recorded for sale {id}"),
        )
    })?;

    let bytes = state.billing.fetch_receipt(&reference).await.map_err(|e| {
        tracing::error!(reference = %reference, error = %e, "Receipt document missing from store");
        AppError::with_message(ErrorCode::ReceiptNotAvailable, "Receipt document missing")
    })?;

    Ok((
        [(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        bytes,
    ))
}
