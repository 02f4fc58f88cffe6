//! Stock service: running per-item balances

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{InwardLot, StockEntry};
use shared::types::{columns, item_key};

use super::inventory::load_lots;
use crate::error::{AppError, AppResult};
use crate::store::{CellValue, Record, RecordStore, Table};

/// Stock service for reading and adjusting item balances
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn RecordStore>,
}

/// Recorded balance and open lots for a single item
#[derive(Debug, Clone, Serialize)]
pub struct ItemStockDetail {
    pub item: String,
    /// Balance held in the Stock table, if the item has an entry
    pub recorded_balance: Option<i64>,
    /// Sum of remaining balances across open lots
    pub available_in_lots: i64,
    /// Remaining lot balances valued at their unit costs
    pub stock_value: Decimal,
    pub lots: Vec<InwardLot>,
}

/// An item whose Stock entry disagrees with its lots
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StockDiscrepancy {
    pub item: String,
    pub recorded_balance: Option<i64>,
    pub lot_balance: i64,
    /// recorded minus lot balance (missing entries count as zero)
    pub difference: i64,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All stock entries in stored order; unreadable rows are skipped
    pub async fn list_stock(&self) -> AppResult<Vec<StockEntry>> {
        let records = self.store.scan(Table::Stock).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match StockEntry::from_fields(record.row, &record.fields) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Unreadable stock row {}: {}", record.row, e);
                    None
                }
            })
            .collect())
    }

    /// Adjust an item's running balance by `delta`, creating the entry on
    /// first use. The caller must hold the item's lock.
    pub async fn update_stock(&self, item: &str, delta: i64) -> AppResult<StockEntry> {
        let key = item_key(item);
        let records = self.store.scan(Table::Stock).await?;
        let existing = records
            .iter()
            .find(|record| record.get(columns::ITEM).map(item_key).as_deref() == Some(key.as_str()));

        match existing {
            Some(record) => {
                let entry = parse_entry(record)?;
                let balance = entry.balance.checked_add(delta).ok_or_else(|| {
                    AppError::DataIntegrity(format!("stock balance of {} overflows", entry.item))
                })?;
                self.store
                    .update_cell(
                        Table::Stock,
                        entry.row,
                        columns::BALANCE,
                        CellValue::from(balance),
                    )
                    .await?;
                tracing::debug!("Stock {}: {} -> {}", entry.item, entry.balance, balance);
                Ok(StockEntry { balance, ..entry })
            }
            None => {
                let item = item.trim().to_string();
                self.store
                    .append(
                        Table::Stock,
                        vec![CellValue::from(item.clone()), CellValue::from(delta)],
                    )
                    .await?;
                tracing::debug!("Stock entry created for {} at {}", item, delta);
                Ok(StockEntry {
                    row: records.len(),
                    item,
                    balance: delta,
                })
            }
        }
    }

    /// Recorded balance plus the open lots backing it
    pub async fn item_detail(&self, item: &str) -> AppResult<ItemStockDetail> {
        let key = item_key(item);
        let entry = self
            .list_stock()
            .await?
            .into_iter()
            .find(|entry| item_key(&entry.item) == key);
        let lots: Vec<InwardLot> = load_lots(self.store.as_ref())
            .await?
            .into_iter()
            .filter(|lot| lot.balance > 0 && item_key(&lot.item) == key)
            .collect();

        if entry.is_none() && lots.is_empty() {
            return Err(AppError::NotFound(format!("Item '{}'", item.trim())));
        }

        let name = entry
            .as_ref()
            .map(|e| e.item.clone())
            .unwrap_or_else(|| item.trim().to_string());
        let overflow = || AppError::DataIntegrity(format!("lot totals of {} overflow", name));

        let available_in_lots = lots
            .iter()
            .try_fold(0i64, |total, lot| total.checked_add(lot.balance))
            .ok_or_else(overflow)?;
        let stock_value = lots
            .iter()
            .try_fold(Decimal::ZERO, |total, lot| {
                lot.remaining_value().and_then(|value| total.checked_add(value))
            })
            .ok_or_else(overflow)?;

        Ok(ItemStockDetail {
            recorded_balance: entry.map(|e| e.balance),
            item: name,
            available_in_lots,
            stock_value,
            lots,
        })
    }

    /// Compare every Stock entry with the sum of its lot balances.
    ///
    /// The two are written separately, so a failed write can leave them
    /// out of step.
    pub async fn reconcile(&self) -> AppResult<Vec<StockDiscrepancy>> {
        let entries = self.list_stock().await?;
        let lots = load_lots(self.store.as_ref()).await?;

        let mut lot_totals: BTreeMap<String, (String, i64)> = BTreeMap::new();
        for lot in lots.iter().filter(|lot| lot.balance > 0) {
            let slot = lot_totals
                .entry(item_key(&lot.item))
                .or_insert_with(|| (lot.item.trim().to_string(), 0));
            slot.1 = slot.1.checked_add(lot.balance).ok_or_else(|| {
                AppError::DataIntegrity(format!("lot balances of {} overflow", lot.item.trim()))
            })?;
        }

        let mut recorded: BTreeMap<String, (String, i64)> = BTreeMap::new();
        for entry in entries {
            let slot = recorded
                .entry(item_key(&entry.item))
                .or_insert_with(|| (entry.item.clone(), 0));
            slot.1 = slot.1.checked_add(entry.balance).ok_or_else(|| {
                AppError::DataIntegrity(format!("stock balances of {} overflow", entry.item))
            })?;
        }

        let mut keys: Vec<&String> = recorded.keys().chain(lot_totals.keys()).collect();
        keys.sort();
        keys.dedup();

        Ok(keys
            .into_iter()
            .filter_map(|key| {
                let rec = recorded.get(key);
                let lot = lot_totals.get(key);
                let recorded_balance = rec.map(|(_, b)| *b);
                let lot_balance = lot.map(|(_, b)| *b).unwrap_or(0);
                let difference = recorded_balance.unwrap_or(0).saturating_sub(lot_balance);
                if difference == 0 && recorded_balance.is_some() {
                    return None;
                }
                let name = rec.or(lot).map(|(n, _)| n.clone()).unwrap_or_default();
                Some(StockDiscrepancy {
                    item: name,
                    recorded_balance,
                    lot_balance,
                    difference,
                })
            })
            .collect())
    }
}

fn parse_entry(record: &Record) -> AppResult<StockEntry> {
    StockEntry::from_fields(record.row, &record.fields).map_err(|e| {
        AppError::DataIntegrity(format!("stock row {} cannot be updated: {}", record.row, e))
    })
}
