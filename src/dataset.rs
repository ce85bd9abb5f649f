use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// A single row of the dataset.
///
/// Each record maps column names to string values. Empty CSV cells are
/// treated as missing and are not stored, so `get` returns `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    /// Returns the value for `column`, or `None` if the cell was empty or
    /// the column does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Renders the record as a JSON object in the given column order.
    pub fn to_json(&self, columns: &[String]) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for col in columns {
            let value = match self.get(col) {
                Some(v) => serde_json::Value::String(v.to_string()),
                None => serde_json::Value::Null,
            };
            map.insert(col.clone(), value);
        }
        serde_json::Value::Object(map)
    }

    fn insert(&mut self, column: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.insert(column.to_string(), value.to_string());
        }
    }
}

/// An immutable, in-memory tabular dataset loaded from a CSV file.
///
/// Built once at startup and shared by reference afterwards. Column order
/// follows the CSV header.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Loads a dataset from a CSV file with a header row.
    ///
    /// Rows shorter than the header are tolerated; the missing trailing
    /// cells simply have no value. Leading/trailing whitespace in cells is
    /// trimmed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.with_context(|| format!("Failed to read CSV row: {}", path.display()))?;
            let mut record = Record::default();
            for (i, col) in columns.iter().enumerate() {
                if let Some(cell) = row.get(i) {
                    record.insert(col, cell);
                }
            }
            records.push(record);
        }

        Ok(Self { columns, records })
    }

    /// Builds a dataset directly from rows, without touching the filesystem.
    ///
    /// `None` cells are missing values. Intended for tests and embedding.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .into_iter()
            .map(|row| {
                let mut record = Record::default();
                for (col, cell) in columns.iter().zip(row) {
                    if let Some(value) = cell {
                        record.insert(col, value);
                    }
                }
                record
            })
            .collect();
        Self { columns, records }
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
