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
use crate::dataset::{Dataset, SchemaPolicy};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Numeric columns in discovery order.
pub fn numeric_columns(dataset: &Dataset, policy: SchemaPolicy) -> Vec<String> {
    dataset
        .columns(policy)
        .into_iter()
        .filter(|column| classify(dataset, column) == ColumnType::Numeric)
        .collect()
}

/// One value per row; absent keys come back as `Null`.
pub fn column_values(dataset: &Dataset, column: &str) -> Vec<Value> {
    dataset
        .rows()
        .iter()
        .map(|row| row.get(column).cloned().unwrap_or_default())
        .collect()
}

/// Finite numbers only, in row order.
pub fn numeric_values(dataset: &Dataset, column: &str) -> Vec<f64> {
    dataset
        .rows()
        .iter()
        .filter_map(|row| row.get(column).and_then(Value::as_finite_f64))
        .collect()
}

/// Like [`numeric_values`] but keeps the row index of each number.
pub fn indexed_numeric_values(dataset: &Dataset, column: &str) -> Vec<(usize, f64)> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.get(column).and_then(Value::as_finite_f64).map(|v| (i, v)))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValueOptions {
    pub numeric_only: bool,
}
impl ColumnValueOptions {
    pub fn raw() -> Self {
        Self { numeric_only: false }
    }
    pub fn numeric() -> Self {
        Self { numeric_only: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Raw(Vec<Value>),
    Numeric(Vec<f64>),
}
impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Raw(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Raw(_) => None,
        }
    }
    pub fn as_raw(&self) -> Option<&[Value]> {
        match self {
            ColumnValues::Raw(v) => Some(v),
            ColumnValues::Numeric(_) => None,
        }
    }
}

pub fn get_column_values(
    dataset: &Dataset,
    column: &str,
    options: ColumnValueOptions,
) -> ColumnValues {
    if options.numeric_only {
        ColumnValues::Numeric(numeric_values(dataset, column))
    } else {
        ColumnValues::Raw(column_values(dataset, column))
    }
}
