//! HTTP handlers for outward (issue) endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::fifo::IssueOutcome;
use shared::models::OutwardTransaction;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{InventoryService, IssueOutwardInput, OutwardReceipt};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub item: String,
    pub quantity: i64,
}

/// List all outward transactions
pub async fn list_outward(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<OutwardTransaction>>> {
    let service = InventoryService::new(state.store, state.locks);
    let transactions = service.list_outward().await?;
    Ok(Json(transactions))
}

/// Issue stock using FIFO costing
pub async fn issue_outward(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<IssueOutwardInput>,
) -> AppResult<(StatusCode, Json<OutwardReceipt>)> {
    let service = InventoryService::new(state.store, state.locks);
    let receipt = service
        .issue_outward(&current_user.0.username, input)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Cost an issue against current lots without writing anything
pub async fn preview_outward(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PreviewQuery>,
) -> AppResult<Json<IssueOutcome>> {
    let service = InventoryService::new(state.store, state.locks);
    let outcome = service.preview_issue(&query.item, query.quantity).await?;
    Ok(Json(outcome))
}
