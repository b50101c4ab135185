// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{AlmanacError, Result};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// One record; key order is the order the keys were read in.
pub type Row = IndexMap<String, Value>;

/// How the set of columns is discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Every key seen in any row, in first-appearance order.
    #[default]
    Union,
    /// Only the keys of the first row; keys introduced later are ignored.
    FirstRow,
}

/// An ordered sequence of rows. Rows may disagree on their keys; an absent
/// key is a missing value, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}
impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// The cell at `row`/`column`; `None` when the row or the key is absent.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
    pub fn columns(&self, policy: SchemaPolicy) -> Vec<String> {
        match policy {
            SchemaPolicy::FirstRow => self
                .rows
                .first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default(),
            SchemaPolicy::Union => {
                let mut seen: IndexSet<&str> = IndexSet::new();
                for row in &self.rows {
                    seen.extend(row.keys().map(String::as_str));
                }
                seen.into_iter().map(str::to_string).collect()
            }
        }
    }

    /// Reads a dataset from a JSON array of row objects.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(AlmanacError::invalid_input(format!(
                    "expected an array of row objects, found {}",
                    json_kind(&other)
                )))
            }
        };
        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let fields = match item {
                serde_json::Value::Object(fields) => fields,
                other => {
                    return Err(AlmanacError::invalid_input(format!(
                        "row {} is not an object (found {})",
                        index + 1,
                        json_kind(&other)
                    )))
                }
            };
            let mut row = Row::with_capacity(fields.len());
            for (column, cell) in fields {
                let value = Value::from_json(&cell).ok_or_else(|| {
                    AlmanacError::invalid_input(format!(
                        "row {}, column '{}': nested values are not supported",
                        index + 1,
                        column
                    ))
                })?;
                row.insert(column, value);
            }
            rows.push(row);
        }
        debug!(rows = rows.len(), "dataset read from JSON");
        Ok(Self { rows })
    }

    /// Reads CSV with a header row. Cells are typed with [`Value::infer`];
    /// short records simply lack the trailing keys.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.clone(), Value::infer(cell)))
                .collect();
            rows.push(row);
        }
        debug!(rows = rows.len(), columns = headers.len(), "dataset read from CSV");
        Ok(Self { rows })
    }
    pub fn from_csv_str(input: &str) -> Result<Self> {
        Self::from_csv_reader(input.as_bytes())
    }

    /// Loads `.json` or `.csv` by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Self::from_json_reader(BufReader::new(File::open(path)?)),
            Some("csv") => Self::from_csv_reader(BufReader::new(File::open(path)?)),
            _ => Err(AlmanacError::invalid_input(format!(
                "unsupported file type for '{}': expected .json or .csv",
                path.display()
            ))),
        }
    }
}
impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}
impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
