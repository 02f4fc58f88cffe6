//! FIFO issue planning
//!
//! Works out which inward lots an issue draws from and what it costs,
//! without touching storage. The plan is only applied once it is known to
//! cover the full requested quantity.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::InwardLot;
use crate::types::item_key;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FifoError {
    #[error("issue quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
    #[error("cost of issuing {item} overflows")]
    CostOverflow { item: String },
}

/// Units taken from a single lot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LotDraw {
    pub row: usize,
    pub used: i64,
    pub unit_cost: Decimal,
    pub balance_before: i64,
}

impl LotDraw {
    pub fn balance_after(&self) -> i64 {
        self.balance_before - self.used
    }

    /// Cost of the drawn units, `None` if it does not fit a decimal
    pub fn cost(&self) -> Option<Decimal> {
        Decimal::from(self.used).checked_mul(self.unit_cost)
    }
}

/// A feasible issue: every draw plus the total cost
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IssuePlan {
    pub item: String,
    pub quantity: i64,
    pub total_cost: Decimal,
    pub draws: Vec<LotDraw>,
}

/// Result of planning an issue
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssueOutcome {
    Issued(IssuePlan),
    InsufficientStock {
        requested: i64,
        available: i64,
        shortfall: i64,
    },
}

impl IssueOutcome {
    pub fn is_issued(&self) -> bool {
        matches!(self, IssueOutcome::Issued(_))
    }
}

/// Plan an issue of `quantity` units of `item` against `lots`.
///
/// Lots must be supplied oldest first. Only lots whose item matches
/// (trimmed, case-insensitive) and that still hold a positive balance are
/// drawn from; scanning stops once the request is covered.
pub fn plan_issue<'a, I>(lots: I, item: &str, quantity: i64) -> Result<IssueOutcome, FifoError>
where
    I: IntoIterator<Item = &'a InwardLot>,
{
    if quantity <= 0 {
        return Err(FifoError::NonPositiveQuantity(quantity));
    }

    let key = item_key(item);
    let mut remaining = quantity;
    let mut total_cost = Decimal::ZERO;
    let mut draws = Vec::new();

    for lot in lots {
        if remaining == 0 {
            break;
        }
        if lot.balance <= 0 || item_key(&lot.item) != key {
            continue;
        }

        let draw = LotDraw {
            row: lot.row,
            used: lot.balance.min(remaining),
            unit_cost: lot.unit_cost,
            balance_before: lot.balance,
        };
        total_cost = draw
            .cost()
            .and_then(|cost| total_cost.checked_add(cost))
            .ok_or_else(|| FifoError::CostOverflow {
                item: item.trim().to_string(),
            })?;
        remaining -= draw.used;
        draws.push(draw);
    }

    if remaining > 0 {
        let available = quantity - remaining;
        return Ok(IssueOutcome::InsufficientStock {
            requested: quantity,
            available,
            shortfall: remaining,
        });
    }

    Ok(IssueOutcome::Issued(IssuePlan {
        item: item.trim().to_string(),
        quantity,
        total_cost,
        draws,
    }))
}

/// Units available for `item` across all open lots
pub fn available_balance<'a, I>(lots: I, item: &str) -> i64
where
    I: IntoIterator<Item = &'a InwardLot>,
{
    let key = item_key(item);
    lots.into_iter()
        .filter(|lot| lot.balance > 0 && item_key(&lot.item) == key)
        .fold(0i64, |total, lot| total.saturating_add(lot.balance))
}
