//! HTTP handlers for stock balance endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::models::StockEntry;

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::stock::{ItemStockDetail, StockDiscrepancy, StockService};
use crate::AppState;

/// List current stock balances
pub async fn list_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockEntry>>> {
    let service = StockService::new(state.store);
    let entries = service.list_stock().await?;
    Ok(Json(entries))
}

/// Get the recorded balance and open lots of one item
pub async fn get_item_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item): Path<String>,
) -> AppResult<Json<ItemStockDetail>> {
    let service = StockService::new(state.store);
    let detail = service.item_detail(&item).await?;
    Ok(Json(detail))
}

/// Report items whose stock balance disagrees with their lots (admin only)
pub async fn get_stock_reconciliation(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockDiscrepancy>>> {
    require_admin(&current_user.0)?;
    let service = StockService::new(state.store);
    let report = service.reconcile().await?;
    Ok(Json(report))
}
