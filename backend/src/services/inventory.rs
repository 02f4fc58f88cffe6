//! Inventory service: inward receipts, FIFO issues and movement history

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::fifo::{plan_issue, FifoError, IssueOutcome, IssuePlan, LotDraw};
use shared::models::{InwardLot, OutwardTransaction};
use shared::types::{columns, format_sheet_date};
use shared::validation::{
    validate_item_name, validate_party_name, validate_quantity, validate_unit_cost,
};
use validator::Validate;

use super::locks::ItemLocks;
use super::stock::StockService;
use crate::error::{AppError, AppResult};
use crate::store::{CellValue, RecordStore, Table};

/// Inventory service for recording receipts and issuing stock
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn RecordStore>,
    locks: ItemLocks,
}

/// Input for recording received stock
#[derive(Debug, Deserialize, Validate)]
pub struct RecordInwardInput {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    pub unit_cost: Decimal,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier: String,
}

/// Input for issuing stock to a recipient
#[derive(Debug, Deserialize, Validate)]
pub struct IssueOutwardInput {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub issued_to: String,
}

/// Result of a recorded receipt
#[derive(Debug, Clone, Serialize)]
pub struct InwardReceipt {
    pub date: String,
    pub item: String,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub supplier: String,
    /// Item balance in the Stock table after the receipt
    pub stock_balance: i64,
}

/// Result of a completed issue
#[derive(Debug, Clone, Serialize)]
pub struct OutwardReceipt {
    pub date: String,
    pub item: String,
    pub quantity: i64,
    pub issued_to: String,
    pub total_cost: Decimal,
    /// Lots the issue drew from, oldest first
    pub draws: Vec<LotDraw>,
    /// Item balance in the Stock table after the issue
    pub stock_balance: i64,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: Arc<dyn RecordStore>, locks: ItemLocks) -> Self {
        Self { store, locks }
    }

    /// Record received stock as a new lot and raise the item's balance
    pub async fn record_inward(
        &self,
        recorded_by: &str,
        input: RecordInwardInput,
    ) -> AppResult<InwardReceipt> {
        input.validate()?;
        validate_item_name(&input.item).map_err(|m| AppError::validation("item", m))?;
        validate_party_name(&input.supplier).map_err(|m| AppError::validation("supplier", m))?;
        validate_quantity(input.quantity).map_err(|m| AppError::validation("quantity", m))?;
        validate_unit_cost(input.unit_cost).map_err(|m| AppError::validation("unit_cost", m))?;

        let item = input.item.trim().to_string();
        let supplier = input.supplier.trim().to_string();
        let date = today();

        let _guard = self.locks.lock(&item).await;

        self.store
            .append(
                Table::Inward,
                vec![
                    CellValue::from(date.clone()),
                    CellValue::from(item.clone()),
                    CellValue::from(input.quantity),
                    CellValue::from(input.unit_cost),
                    CellValue::from(supplier.clone()),
                    CellValue::from(input.quantity),
                ],
            )
            .await?;

        let stock = StockService::new(self.store.clone())
            .update_stock(&item, input.quantity)
            .await?;

        tracing::info!(
            "Inward recorded by {}: {} x {} @ {} from {}",
            recorded_by,
            input.quantity,
            item,
            input.unit_cost,
            supplier
        );

        Ok(InwardReceipt {
            date,
            item,
            quantity: input.quantity,
            unit_cost: input.unit_cost,
            supplier,
            stock_balance: stock.balance,
        })
    }

    /// Issue stock to a recipient using FIFO costing.
    ///
    /// Lots are only written once the whole quantity is known to be
    /// available; an insufficient-stock request changes nothing.
    pub async fn issue_outward(
        &self,
        issued_by: &str,
        input: IssueOutwardInput,
    ) -> AppResult<OutwardReceipt> {
        input.validate()?;
        validate_item_name(&input.item).map_err(|m| AppError::validation("item", m))?;
        validate_party_name(&input.issued_to).map_err(|m| AppError::validation("issued_to", m))?;
        validate_quantity(input.quantity).map_err(|m| AppError::validation("quantity", m))?;

        let item = input.item.trim().to_string();
        let issued_to = input.issued_to.trim().to_string();

        let _guard = self.locks.lock(&item).await;

        let plan = match self.consume(&item, input.quantity).await? {
            IssueOutcome::Issued(plan) => plan,
            IssueOutcome::InsufficientStock {
                requested,
                available,
                ..
            } => {
                return Err(AppError::InsufficientStock {
                    item,
                    requested,
                    available,
                })
            }
        };

        let date = today();
        self.store
            .append(
                Table::Outward,
                vec![
                    CellValue::from(date.clone()),
                    CellValue::from(item.clone()),
                    CellValue::from(input.quantity),
                    CellValue::from(issued_to.clone()),
                    CellValue::from(plan.total_cost),
                ],
            )
            .await?;

        let stock = StockService::new(self.store.clone())
            .update_stock(&item, -input.quantity)
            .await?;

        tracing::info!(
            "Outward recorded by {}: {} x {} to {} costing {}",
            issued_by,
            input.quantity,
            item,
            issued_to,
            plan.total_cost
        );

        Ok(OutwardReceipt {
            date,
            item,
            quantity: input.quantity,
            issued_to,
            total_cost: plan.total_cost,
            draws: plan.draws,
            stock_balance: stock.balance,
        })
    }

    /// Consume `quantity` units of `item` from the oldest lots.
    ///
    /// Returns the outcome without recording an outward transaction or
    /// touching the Stock table.
    pub async fn fifo_issue(&self, item: &str, quantity: i64) -> AppResult<IssueOutcome> {
        let _guard = self.locks.lock(item).await;
        self.consume(item, quantity).await
    }

    /// Plan an issue without writing anything
    pub async fn preview_issue(&self, item: &str, quantity: i64) -> AppResult<IssueOutcome> {
        let lots = load_lots(self.store.as_ref()).await?;
        plan(&lots, item, quantity)
    }

    /// All valid inward lots in stored order
    pub async fn list_inward(&self) -> AppResult<Vec<InwardLot>> {
        load_lots(self.store.as_ref()).await
    }

    /// All outward transactions in stored order
    pub async fn list_outward(&self) -> AppResult<Vec<OutwardTransaction>> {
        let records = self.store.scan(Table::Outward).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match OutwardTransaction::from_fields(record.row, &record.fields) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    tracing::debug!("Skipping outward row {}: {}", record.row, e);
                    None
                }
            })
            .collect())
    }

    /// Plan against current lots and, when feasible, write the new balances.
    /// Caller holds the item lock.
    async fn consume(&self, item: &str, quantity: i64) -> AppResult<IssueOutcome> {
        let lots = load_lots(self.store.as_ref()).await?;
        let outcome = plan(&lots, item, quantity)?;

        match &outcome {
            IssueOutcome::Issued(issue) => self.apply(issue).await?,
            IssueOutcome::InsufficientStock {
                requested,
                available,
                shortfall,
            } => {
                tracing::info!(
                    "Insufficient stock for {}: requested {}, available {}, short {}",
                    item,
                    requested,
                    available,
                    shortfall
                );
            }
        }

        Ok(outcome)
    }

    async fn apply(&self, issue: &IssuePlan) -> AppResult<()> {
        for (applied, draw) in issue.draws.iter().enumerate() {
            if let Err(e) = self
                .store
                .update_cell(
                    Table::Inward,
                    draw.row,
                    columns::BALANCE,
                    CellValue::from(draw.balance_after()),
                )
                .await
            {
                tracing::error!(
                    "Issue of {} stopped after {} of {} lot updates: {}",
                    issue.item,
                    applied,
                    issue.draws.len(),
                    e
                );
                return Err(e.into());
            }
            tracing::debug!(
                "Lot row {} of {}: {} -> {}",
                draw.row,
                issue.item,
                draw.balance_before,
                draw.balance_after()
            );
        }
        Ok(())
    }
}

fn plan(lots: &[InwardLot], item: &str, quantity: i64) -> AppResult<IssueOutcome> {
    plan_issue(lots, item, quantity).map_err(|e| match e {
        FifoError::NonPositiveQuantity(_) => AppError::validation("quantity", e.to_string()),
        FifoError::CostOverflow { .. } => AppError::DataIntegrity(e.to_string()),
    })
}

/// Read the Inward table, skipping rows that are incomplete or unparseable
pub async fn load_lots(store: &dyn RecordStore) -> AppResult<Vec<InwardLot>> {
    let records = store.scan(Table::Inward).await?;
    Ok(records
        .into_iter()
        .filter_map(|record| match InwardLot::from_fields(record.row, &record.fields) {
            Ok(lot) => Some(lot),
            Err(e) => {
                tracing::debug!("Skipping inward row {}: {}", record.row, e);
                None
            }
        })
        .collect())
}

fn today() -> String {
    format_sheet_date(Utc::now().date_naive())
}
