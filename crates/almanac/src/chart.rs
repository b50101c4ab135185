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

//! Chart-ready series. Rendering is left to the caller.

use crate::dataset::Dataset;
use crate::ordering::{month_index, month_label, parse_date, pick_key_column};
use crate::summary::Summary;
use crate::value::Value;
use chrono::Datelike;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_CHART_ROWS: usize = 20;
pub const DEFAULT_CHART_COLUMNS: usize = 2;
pub const MAX_CHART_COLUMNS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub columns: Vec<String>,
    pub points: Vec<ChartPoint>,
}
impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    /// Values of one column across all points.
    pub fn column(&self, name: &str) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|p| p.values.get(name).copied())
            .collect()
    }
}

/// Month name for a cell of the label column, falling back to the raw text.
fn point_label(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => month_index(text)
            .or_else(|| parse_date(text).map(|dt| dt.month()))
            .and_then(month_label)
            .map(str::to_string)
            .or_else(|| Some(text.clone())),
        Value::Number(n) if n.fract() == 0.0 && (1.0..=12.0).contains(n) => {
            month_label(*n as u32).map(str::to_string)
        }
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Null => None,
    }
}

/// The first [`MAX_CHART_ROWS`] rows of up to two numeric columns (ten with
/// `show_all`). Non-numeric cells plot as `0`.
pub fn chart_series(dataset: &Dataset, summary: &Summary, show_all: bool) -> ChartSeries {
    let limit = if show_all {
        MAX_CHART_COLUMNS
    } else {
        DEFAULT_CHART_COLUMNS
    };
    let columns: Vec<String> = summary
        .numeric_column_names()
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return ChartSeries::default();
    }
    let label_column = pick_key_column(summary.column_names());
    let points = dataset
        .rows()
        .iter()
        .take(MAX_CHART_ROWS)
        .enumerate()
        .map(|(i, row)| {
            let name = label_column
                .as_ref()
                .and_then(|c| row.get(c))
                .and_then(point_label)
                .unwrap_or_else(|| format!("Row {}", i + 1));
            let values = columns
                .iter()
                .map(|c| {
                    let v = row.get(c).and_then(Value::as_finite_f64).unwrap_or(0.0);
                    (c.clone(), v)
                })
                .collect();
            ChartPoint { name, values }
        })
        .collect();
    ChartSeries { columns, points }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
}
impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub reason: String,
}

pub fn chart_suggestions(summary: &Summary) -> Vec<ChartSuggestion> {
    let numeric = summary.numeric_column_names();
    let Some(first) = numeric.first() else {
        return Vec::new();
    };
    let mut suggestions = Vec::new();
    if let Some(key) = pick_key_column(summary.column_names()) {
        suggestions.push(ChartSuggestion {
            kind: ChartKind::Line,
            columns: vec![key.clone(), first.to_string()],
            reason: format!("{first} over {key} shows how it changes through time"),
        });
    }
    if numeric.len() >= 2 {
        suggestions.push(ChartSuggestion {
            kind: ChartKind::Scatter,
            columns: vec![numeric[0].to_string(), numeric[1].to_string()],
            reason: format!("{} against {} shows their relationship", numeric[0], numeric[1]),
        });
    }
    suggestions.push(ChartSuggestion {
        kind: ChartKind::Bar,
        columns: numeric
            .iter()
            .take(DEFAULT_CHART_COLUMNS)
            .map(|c| c.to_string())
            .collect(),
        reason: "Bars compare values row by row".to_string(),
    });
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SchemaPolicy;
    use crate::summary::summarize;
    use serde_json::json;

    fn load(value: serde_json::Value) -> (Dataset, Summary) {
        let ds = Dataset::from_json_value(value).unwrap();
        let summary = summarize(&ds, SchemaPolicy::Union);
        (ds, summary)
    }

    #[test]
    fn month_labels_and_zero_fill() {
        let (ds, summary) = load(json!([
            {"month": "jan", "a": 1, "b": 2, "c": 3},
            {"month": 2, "a": "n/a", "b": 4, "c": 5},
            {"month": "2024-03-15", "a": 3, "b": 6, "c": 7},
            {"month": null, "a": 4, "b": 8, "c": 9}
        ]));
        let series = chart_series(&ds, &summary, false);
        assert_eq!(series.columns, vec!["a", "b"]);
        let names: Vec<_> = series.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["January", "February", "March", "Row 4"]);
        assert_eq!(series.column("a"), vec![1.0, 0.0, 3.0, 4.0]);
        assert_eq!(chart_series(&ds, &summary, true).columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn caps_rows_and_handles_no_numeric_columns() {
        let rows: Vec<_> = (0..30).map(|i| json!({"v": i})).collect();
        let (ds, summary) = load(serde_json::Value::Array(rows));
        let series = chart_series(&ds, &summary, false);
        assert_eq!(series.points.len(), MAX_CHART_ROWS);
        assert_eq!(series.points[0].name, "Row 1");

        let (ds, summary) = load(json!([{"name": "x"}]));
        assert!(chart_series(&ds, &summary, false).is_empty());
        assert!(chart_suggestions(&summary).is_empty());
    }

    #[test]
    fn labels_follow_the_summary_columns() {
        let ds = Dataset::from_json_value(json!([
            {"v": 1}, {"v": 2, "Month": "March"}, {"v": 3, "Month": "January"}
        ]))
        .unwrap();
        let names = |policy| {
            let summary = summarize(&ds, policy);
            chart_series(&ds, &summary, false)
                .points
                .into_iter()
                .map(|p| p.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(SchemaPolicy::FirstRow), vec!["Row 1", "Row 2", "Row 3"]);
        assert_eq!(names(SchemaPolicy::Union), vec!["Row 1", "March", "January"]);

        let summary = summarize(&ds, SchemaPolicy::FirstRow);
        let kinds: Vec<_> = chart_suggestions(&summary).into_iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Bar]);
    }

    #[test]
    fn points_serialise_flat() {
        let (ds, summary) = load(json!([{"Month": "May", "Steps": 10}]));
        let value = serde_json::to_value(&chart_series(&ds, &summary, false).points[0]).unwrap();
        assert_eq!(value, json!({"name": "May", "Steps": 10.0}));
    }

    #[test]
    fn suggestions_follow_the_columns() {
        let (ds, summary) = load(json!([
            {"Date": "2024-01-01", "x": 1, "y": 2},
            {"Date": "2024-01-02", "x": 2, "y": 3}
        ]));
        let kinds: Vec<_> = chart_suggestions(&summary)
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Scatter, ChartKind::Bar]);
    }
}
