//! Inventory models: inward lots, outward issues and stock entries

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    columns, optional, parse_decimal, parse_quantity, required, Fields, RowError,
};

/// A single receipt of stock, consumed oldest-first by outward issues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InwardLot {
    /// Zero-based data row (row 0 sits directly below the header)
    pub row: usize,
    pub date: String,
    pub item: String,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub supplier: String,
    /// Units of this lot not yet issued
    pub balance: i64,
}

impl InwardLot {
    /// Parse an Inward sheet row.
    ///
    /// Rows without an item, balance or unit cost, or whose numbers do not
    /// parse, are rejected so callers can skip them.
    pub fn from_fields(row: usize, fields: &Fields) -> Result<Self, RowError> {
        let item = required(fields, columns::ITEM)?;
        let balance = parse_quantity(columns::BALANCE, required(fields, columns::BALANCE)?)?;
        let unit_cost = parse_decimal(columns::UNIT_COST, required(fields, columns::UNIT_COST)?)?;
        if unit_cost < Decimal::ZERO {
            return Err(RowError::Negative {
                field: columns::UNIT_COST,
                value: unit_cost.to_string(),
            });
        }

        // Received quantity is informational; fall back to the balance when absent.
        let quantity = match fields.get(columns::QUANTITY).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => parse_quantity(columns::QUANTITY, raw)?,
            _ => balance,
        };

        Ok(Self {
            row,
            date: optional(fields, columns::DATE).to_string(),
            item: item.to_string(),
            quantity,
            unit_cost,
            supplier: optional(fields, columns::SUPPLIER).to_string(),
            balance,
        })
    }

    /// Value of the units still on hand in this lot, `None` on overflow
    pub fn remaining_value(&self) -> Option<Decimal> {
        Decimal::from(self.balance.max(0)).checked_mul(self.unit_cost)
    }
}

/// A recorded issue of stock to a recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutwardTransaction {
    pub row: usize,
    pub date: String,
    pub item: String,
    pub quantity: i64,
    pub issued_to: String,
    /// FIFO cost of the issued quantity
    pub cost: Decimal,
}

impl OutwardTransaction {
    pub fn from_fields(row: usize, fields: &Fields) -> Result<Self, RowError> {
        let item = required(fields, columns::ITEM)?;
        let quantity = parse_quantity(columns::QUANTITY, required(fields, columns::QUANTITY)?)?;
        let cost = match fields.get(columns::COST).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => parse_decimal(columns::COST, raw)?,
            _ => Decimal::ZERO,
        };

        Ok(Self {
            row,
            date: optional(fields, columns::DATE).to_string(),
            item: item.to_string(),
            quantity,
            issued_to: optional(fields, columns::ISSUED_TO).to_string(),
            cost,
        })
    }
}

/// Running balance for one item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockEntry {
    pub row: usize,
    pub item: String,
    /// Signed running balance; can dip below zero if the sheet was edited by hand
    pub balance: i64,
}

impl StockEntry {
    pub fn from_fields(row: usize, fields: &Fields) -> Result<Self, RowError> {
        let item = required(fields, columns::ITEM)?;
        let balance = parse_quantity(columns::BALANCE, required(fields, columns::BALANCE)?)?;

        Ok(Self {
            row,
            item: item.to_string(),
            balance,
        })
    }
}
