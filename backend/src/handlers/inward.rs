//! HTTP handlers for inward (receipt) endpoints

use axum::{extract::State, http::StatusCode, Json};
use shared::models::InwardLot;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{InventoryService, InwardReceipt, RecordInwardInput};
use crate::AppState;

/// List all inward lots
pub async fn list_inward(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InwardLot>>> {
    let service = InventoryService::new(state.store, state.locks);
    let lots = service.list_inward().await?;
    Ok(Json(lots))
}

/// Record received stock
pub async fn record_inward(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordInwardInput>,
) -> AppResult<(StatusCode, Json<InwardReceipt>)> {
    let service = InventoryService::new(state.store, state.locks);
    let receipt = service
        .record_inward(&current_user.0.username, input)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
