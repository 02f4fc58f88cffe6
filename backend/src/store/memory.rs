//! In-process record store for development and tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CellValue, Record, RecordStore, StoreError, StoreResult, Table};

/// Tables held in memory as rendered cell strings.
///
/// `set_unavailable(true)` makes every call fail the way an unreachable
/// backend would.
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Vec<String>>>>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Table::ALL.iter().map(|t| (*t, Vec::new())).collect()),
            unavailable: AtomicBool::new(false),
            writes: AtomicU64::new(0),
        }
    }

    /// Seed a table with raw rows, in column order
    pub fn with_rows<R, C>(mut self, table: Table, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.tables.get_mut().entry(table).or_default().extend(
            rows.into_iter()
                .map(|cells| cells.into_iter().map(Into::into).collect::<Vec<String>>()),
        );
        self
    }

    /// Seed the Users table
    pub fn with_user(self, username: &str, password: &str, role: &str) -> Self {
        self.with_rows(Table::Users, [[username, password, role]])
    }

    /// Toggle simulated backend outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful appends and cell updates so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a table's raw rows
    pub async fn rows(&self, table: Table) -> Vec<Vec<String>> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        self.check_available()?;
        let header: Vec<String> = table.columns().iter().map(|c| c.to_string()).collect();
        let tables = self.tables.lock().await;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .enumerate()
                    .map(|(i, cells)| Record::from_cells(i, &header, cells))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append(&self, table: Table, values: Vec<CellValue>) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        tables
            .entry(table)
            .or_default()
            .push(values.iter().map(CellValue::render).collect());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: &str,
        value: CellValue,
    ) -> StoreResult<()> {
        self.check_available()?;
        let col = table.column_index(column)?;
        let mut tables = self.tables.lock().await;
        let cells = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(row))
            .ok_or(StoreError::RowOutOfRange {
                table: table.name(),
                row,
            })?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.render();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
