//! Row-oriented record store backing the inventory
//!
//! Every table is an ordered list of rows keyed by a fixed header. Rows are
//! addressed by their zero-based position below the header row. The store
//! offers no transactions; callers serialise writes per item themselves.

use async_trait::async_trait;
use shared::types::{columns, Fields};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// The four sheets the inventory lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Inward,
    Outward,
    Stock,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Users, Table::Inward, Table::Outward, Table::Stock];

    /// Sheet (tab) name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "Users",
            Table::Inward => "Inward",
            Table::Outward => "Outward",
            Table::Stock => "Stock",
        }
    }

    /// Header row, in column order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => &[columns::USERNAME, columns::PASSWORD, columns::ROLE],
            Table::Inward => &[
                columns::DATE,
                columns::ITEM,
                columns::QUANTITY,
                columns::UNIT_COST,
                columns::SUPPLIER,
                columns::BALANCE,
            ],
            Table::Outward => &[
                columns::DATE,
                columns::ITEM,
                columns::QUANTITY,
                columns::ISSUED_TO,
                columns::COST,
            ],
            Table::Stock => &[columns::ITEM, columns::BALANCE],
        }
    }

    /// Zero-based position of a column
    pub fn column_index(&self, column: &str) -> StoreResult<usize> {
        self.columns()
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: self.name(),
                column: column.to_string(),
            })
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row read from a table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Zero-based data row
    pub row: usize,
    pub fields: Fields,
}

impl Record {
    /// Zip a header with raw cell values. Missing trailing cells are blank.
    pub fn from_cells(row: usize, header: &[String], cells: &[String]) -> Self {
        let fields = header
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.trim().is_empty())
            .map(|(i, name)| {
                let value = cells.get(i).cloned().unwrap_or_default();
                (name.trim().to_string(), value)
            })
            .collect();
        Self { row, fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// A cell value to write
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(rust_decimal::Decimal),
}

impl CellValue {
    /// Render the value as the sheet would display it
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Decimal(d) => d.normalize().to_string(),
        }
    }

    /// JSON representation for the Sheets values API
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Integer(n) => serde_json::Value::from(*n),
            // Written RAW, so amounts must go out as numbers to stay numeric cells.
            CellValue::Decimal(d) => {
                let text = d.normalize().to_string();
                text.parse::<serde_json::Number>()
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::String(text))
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<rust_decimal::Decimal> for CellValue {
    fn from(d: rust_decimal::Decimal) -> Self {
        CellValue::Decimal(d)
    }
}

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Network failure, timeout, throttling or a 5xx from the backend
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request (4xx other than throttling)
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed store response: {0}")]
    Malformed(String),

    #[error("unknown column '{column}' in table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("row {row} is out of range for table {table}")]
    RowOutOfRange { table: &'static str, row: usize },
}

impl StoreError {
    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A row-ordered table store: scan everything, append a row, update a cell
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs and health output
    fn backend_tag(&self) -> &'static str;

    /// All data rows of a table, in stored order
    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>>;

    /// Append a row; values follow [`Table::columns`] order
    async fn append(&self, table: Table, values: Vec<CellValue>) -> StoreResult<()>;

    /// Overwrite one cell of an existing row
    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: &str,
        value: CellValue,
    ) -> StoreResult<()>;
}
