//! Google Sheets values API client
//!
//! Implements [`RecordStore`] on top of one spreadsheet with a tab per table.
//! Row 1 of every tab is the header; data row `n` lives on sheet row `n + 2`.
//! Values are written RAW so text such as item codes and dates is stored
//! exactly as sent, never re-parsed or evaluated as a formula.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::google_auth::{classify_status, ServiceAccountAuth, ServiceAccountKey};
use crate::config::StoreConfig;
use crate::store::{CellValue, Record, RecordStore, StoreError, StoreResult, Table};

/// Spreadsheet-backed record store
pub struct SheetsStore {
    client: reqwest::Client,
    auth: ServiceAccountAuth,
    base_url: String,
    spreadsheet_id: String,
}

/// ValueRange payload returned by `values.get`
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsStore {
    /// Build a store from configuration, loading the service account key
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("store.spreadsheet_id is required for the sheets backend"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let auth = ServiceAccountAuth::new(client.clone(), key, config.token_url.clone())?;

        Ok(Self {
            client,
            auth,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> StoreResult<reqwest::Response> {
        let token = self.auth.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("sheets request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }
        Ok(response)
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    fn backend_tag(&self) -> &'static str {
        "google-sheets"
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        tracing::debug!("Reading all rows of {}", table);
        let request = self
            .client
            .get(self.values_url(table.name()))
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ]);
        let range: ValueRange = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("cannot parse values of {}: {}", table, e)))?;

        Ok(records_from_values(range.values))
    }

    async fn append(&self, table: Table, values: Vec<CellValue>) -> StoreResult<()> {
        tracing::debug!("Appending row to {}", table);
        let row: Vec<Value> = values.iter().map(CellValue::to_json).collect();
        let request = self
            .client
            .post(self.values_url(&format!("{}!A1:append", table.name())))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }));
        self.send(request).await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: &str,
        value: CellValue,
    ) -> StoreResult<()> {
        let range = cell_range(table, row, table.column_index(column)?);
        tracing::debug!("Updating cell {}", range);
        let request = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [[value.to_json()]],
            }));
        self.send(request).await?;
        Ok(())
    }
}

/// Turn a raw values grid (header first) into records
fn records_from_values(values: Vec<Vec<Value>>) -> Vec<Record> {
    let mut rows = values.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Vec::new(),
    };

    rows.enumerate()
        .map(|(i, cells)| {
            let cells: Vec<String> = cells.iter().map(cell_text).collect();
            Record::from_cells(i, &header, &cells)
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// A1 reference for a data cell, e.g. `Inward!F3`
fn cell_range(table: Table, row: usize, column: usize) -> String {
    format!("{}!{}{}", table.name(), column_letter(column), row + 2)
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
