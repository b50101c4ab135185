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

use crate::classifier::{classify, ColumnType};
use crate::columns::numeric_values;
use crate::dataset::{Dataset, SchemaPolicy};
use crate::format::{format_grouped, format_percentage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Structural digest of a dataset. Maps keep column discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub text_columns: usize,
    pub column_types: IndexMap<String, ColumnType>,
    pub missing_values: IndexMap<String, usize>,
}

pub fn summarize(dataset: &Dataset, policy: SchemaPolicy) -> Summary {
    let columns = dataset.columns(policy);
    let mut column_types = IndexMap::with_capacity(columns.len());
    let mut missing_values = IndexMap::with_capacity(columns.len());
    for column in columns {
        let missing = dataset
            .rows()
            .iter()
            .filter(|row| row.get(&column).map_or(true, |v| v.is_missing()))
            .count();
        column_types.insert(column.clone(), classify(dataset, &column));
        missing_values.insert(column, missing);
    }
    let numeric_columns = column_types.values().filter(|t| t.is_numeric()).count();
    let summary = Summary {
        total_rows: dataset.len(),
        total_columns: column_types.len(),
        numeric_columns,
        text_columns: column_types.len() - numeric_columns,
        column_types,
        missing_values,
    };
    debug!(
        rows = summary.total_rows,
        columns = summary.total_columns,
        numeric = summary.numeric_columns,
        "dataset summarised"
    );
    summary
}

impl Summary {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.column_types.keys().map(String::as_str)
    }
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.names_of(ColumnType::Numeric)
    }
    pub fn text_column_names(&self) -> Vec<&str> {
        self.names_of(ColumnType::Text)
    }
    fn names_of(&self, kind: ColumnType) -> Vec<&str> {
        self.column_types
            .iter()
            .filter(|(_, t)| **t == kind)
            .map(|(c, _)| c.as_str())
            .collect()
    }
    /// Columns with at least one missing cell, in discovery order.
    pub fn columns_with_missing(&self) -> Vec<(&str, usize)> {
        self.missing_values
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(c, count)| (c.as_str(), *count))
            .collect()
    }
    /// `count / total_rows * 100` with one decimal place.
    pub fn missing_percentage(&self, count: usize) -> String {
        format_percentage(count, self.total_rows)
    }
    pub fn is_complete(&self) -> bool {
        self.missing_values.values().all(|count| *count == 0)
    }
}
impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows, {} columns ({} numeric, {} text)",
            format_grouped(self.total_rows as f64),
            self.total_columns,
            self.numeric_columns,
            self.text_columns
        )
    }
}

/// Descriptive statistics over the finite values of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

pub fn describe_column(dataset: &Dataset, column: &str) -> Option<ColumnStats> {
    describe_values(&numeric_values(dataset, column))
}

pub fn describe_values(values: &[f64]) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    let min = sorted[0];
    let max = sorted[count - 1];
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
    Some(ColumnStats {
        count,
        sum,
        mean,
        median,
        min,
        max,
        range: max - min,
        std_dev: variance.sqrt(),
    })
}
