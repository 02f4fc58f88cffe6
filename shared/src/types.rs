//! Common types used across the inventory service

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Header-keyed cell values of a single sheet row
pub type Fields = BTreeMap<String, String>;

/// Date format used for the `Date` column of every table (e.g. "23-12-2024")
pub const SHEET_DATE_FORMAT: &str = "%d-%m-%Y";

/// Column headers as they appear on row 1 of each sheet
pub mod columns {
    pub const DATE: &str = "Date";
    pub const ITEM: &str = "Item";
    pub const QUANTITY: &str = "Quantity";
    pub const UNIT_COST: &str = "Unit Cost";
    pub const SUPPLIER: &str = "Supplier";
    pub const BALANCE: &str = "Balance";
    pub const ISSUED_TO: &str = "Issued To";
    pub const COST: &str = "Cost";
    pub const USERNAME: &str = "Username";
    pub const PASSWORD: &str = "Password";
    pub const ROLE: &str = "Role";
}

/// Reasons a sheet row cannot be turned into a typed record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing value for column '{0}'")]
    MissingField(&'static str),

    #[error("column '{field}' holds a non-numeric value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("column '{field}' holds a negative value '{value}'")]
    Negative { field: &'static str, value: String },
}

/// Normalized lookup key for an item name.
///
/// Item names are compared trimmed and case-insensitively, so "Widget " and
/// "widget" refer to the same lots and stock entry.
pub fn item_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check whether two item names refer to the same item
pub fn items_match(a: &str, b: &str) -> bool {
    item_key(a) == item_key(b)
}

/// Format a calendar date the way the sheets store it
pub fn format_sheet_date(date: NaiveDate) -> String {
    date.format(SHEET_DATE_FORMAT).to_string()
}

/// Fetch a non-blank cell, trimmed
pub fn required<'a>(fields: &'a Fields, column: &'static str) -> Result<&'a str, RowError> {
    fields
        .get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(RowError::MissingField(column))
}

/// Fetch a cell, defaulting to an empty string
pub fn optional<'a>(fields: &'a Fields, column: &str) -> &'a str {
    fields.get(column).map(|v| v.trim()).unwrap_or_default()
}

/// Parse a decimal cell
pub fn parse_decimal(column: &'static str, raw: &str) -> Result<Decimal, RowError> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| RowError::InvalidNumber {
            field: column,
            value: raw.to_string(),
        })
}

/// Parse a whole-unit quantity cell.
///
/// Sheets frequently render integers as "7.0"; fractional values are
/// truncated toward zero.
pub fn parse_quantity(column: &'static str, raw: &str) -> Result<i64, RowError> {
    parse_decimal(column, raw)?
        .trunc()
        .to_i64()
        .ok_or_else(|| RowError::InvalidNumber {
            field: column,
            value: raw.trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_item_key_trims_and_lowercases() {
        assert_eq!(item_key("  Widget "), "widget");
        assert!(items_match("Widget ", "widget"));
        assert!(!items_match("Widget", "Widgets"));
    }

    #[test]
    fn test_parse_quantity_truncates() {
        assert_eq!(parse_quantity("Balance", "7"), Ok(7));
        assert_eq!(parse_quantity("Balance", "7.0"), Ok(7));
        assert_eq!(parse_quantity("Balance", "7.9"), Ok(7));
        assert_eq!(parse_quantity("Balance", "-2.5"), Ok(-2));
        assert!(parse_quantity("Balance", "seven").is_err());
    }

    #[test]
    fn test_parse_decimal_accepts_scientific() {
        assert_eq!(parse_decimal("Unit Cost", "2.50"), Ok(Decimal::new(250, 2)));
        assert_eq!(parse_decimal("Unit Cost", "1e2"), Ok(Decimal::from(100)));
        assert!(parse_decimal("Unit Cost", "").is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        let row = fields(&[("Item", "  "), ("Supplier", "Acme")]);
        assert_eq!(required(&row, "Item"), Err(RowError::MissingField("Item")));
        assert_eq!(required(&row, "Supplier"), Ok("Acme"));
        assert_eq!(optional(&row, "Date"), "");
    }

    #[test]
    fn test_format_sheet_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_sheet_date(date), "07-03-2024");
    }
}
