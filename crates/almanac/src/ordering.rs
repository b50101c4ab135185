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

//! Sequence ordering for trend detection and chart labels.
//!
//! A dataset is read in row order unless it carries a month or date column,
//! in which case rows are sorted by that column. Rows whose key cannot be
//! read keep their relative order after the keyed rows.

use crate::dataset::{Dataset, SchemaPolicy};
use crate::summary::Summary;
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y%m%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Month(u32),
    Instant(i64),
}

/// 1-based month index for a full month name or an abbreviation of at
/// least three letters, case-insensitive.
pub fn month_index(text: &str) -> Option<u32> {
    let needle = text.trim().trim_end_matches('.').to_ascii_lowercase();
    if needle.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.to_ascii_lowercase().starts_with(&needle))
        .map(|i| i as u32 + 1)
}

pub fn month_label(index: u32) -> Option<&'static str> {
    MONTHS.get(index.checked_sub(1)? as usize).copied()
}

pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Seconds since the epoch for the supported date layouts.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    parse_date(text).map(|dt| dt.and_utc().timestamp())
}

fn sort_key(value: &Value, month_column: bool) -> Option<SortKey> {
    match value {
        Value::Text(text) => month_index(text)
            .map(SortKey::Month)
            .or_else(|| parse_timestamp(text).map(SortKey::Instant)),
        Value::Number(n) if n.fract() == 0.0 => {
            if month_column && (1.0..=12.0).contains(n) {
                Some(SortKey::Month(*n as u32))
            } else if !month_column {
                parse_timestamp(&format!("{n:.0}")).map(SortKey::Instant)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Lowercase words of a column name, split on punctuation and camelCase.
fn name_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn is_date_name(name: &str) -> bool {
    name_words(name).iter().any(|w| w.starts_with("date"))
}

/// First name mentioning a month, else the first with a `date` word
/// (`Date`, `order_date`, `DateTime`; not `Mandate` or `LastUpdated`).
pub fn pick_key_column<'a, I>(columns: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let columns: Vec<&str> = columns.into_iter().collect();
    columns
        .iter()
        .find(|c| c.to_lowercase().contains("month"))
        .or_else(|| columns.iter().find(|c| is_date_name(c)))
        .map(|c| c.to_string())
}

/// Key column among the columns `policy` discovers.
pub fn key_column(dataset: &Dataset, policy: SchemaPolicy) -> Option<String> {
    let columns = dataset.columns(policy);
    pick_key_column(columns.iter().map(String::as_str))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOrdering {
    key_column: Option<String>,
    indices: Vec<usize>,
    labels: Vec<String>,
}
impl RowOrdering {
    /// Plain row order labelled `Row n`.
    pub fn natural(len: usize) -> Self {
        Self {
            key_column: None,
            indices: (0..len).collect(),
            labels: (1..=len).map(|n| format!("Row {n}")).collect(),
        }
    }

    pub fn detect(dataset: &Dataset, policy: SchemaPolicy) -> Self {
        Self::keyed_by(dataset, key_column(dataset, policy))
    }

    /// Ordering keyed on the columns `summary` describes.
    pub fn for_summary(dataset: &Dataset, summary: &Summary) -> Self {
        Self::keyed_by(dataset, pick_key_column(summary.column_names()))
    }

    pub fn keyed_by(dataset: &Dataset, column: Option<String>) -> Self {
        let Some(column) = column else {
            return Self::natural(dataset.len());
        };
        let month_column = column.to_ascii_lowercase().contains("month");
        let keys: Vec<Option<SortKey>> = dataset
            .rows()
            .iter()
            .map(|row| row.get(&column).and_then(|v| sort_key(v, month_column)))
            .collect();
        if keys.iter().filter(|k| k.is_some()).count() < 2 {
            return Self::natural(dataset.len());
        }
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        // Keyed rows first by key; unkeyed rows keep their relative order.
        indices.sort_by_key(|&i| (keys[i].is_none(), keys[i]));
        let labels = indices
            .iter()
            .map(|&i| {
                let raw = dataset.get(i, &column).filter(|v| !v.is_missing());
                match (keys[i], raw) {
                    (Some(SortKey::Month(m)), _) => {
                        month_label(m).map(str::to_string).unwrap_or_default()
                    }
                    (_, Some(value)) => value.to_string(),
                    (_, None) => format!("Row {}", i + 1),
                }
            })
            .collect();
        Self {
            key_column: Some(column),
            indices,
            labels,
        }
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }
    pub fn is_keyed(&self) -> bool {
        self.key_column.is_some()
    }
    /// Row indices in sequence order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
    /// Display label for each position of [`Self::indices`].
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Finite values of `column` in sequence order, paired with their labels.
    pub fn series(&self, dataset: &Dataset, column: &str) -> Vec<(String, f64)> {
        self.indices
            .iter()
            .zip(&self.labels)
            .filter_map(|(&i, label)| {
                dataset
                    .get(i, column)
                    .and_then(Value::as_finite_f64)
                    .map(|v| (label.clone(), v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn month_names_and_abbreviations() {
        assert_eq!(month_index("January"), Some(1));
        assert_eq!(month_index("oct"), Some(10));
        assert_eq!(month_index("Sept."), Some(9));
        assert_eq!(month_index("Ma"), None);
        assert_eq!(month_index("Smarch"), None);
        assert_eq!(month_label(5), Some("May"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }

    #[test]
    fn dates_parse_in_supported_layouts() {
        let day = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(parse_timestamp("03/01/2024"), Some(day));
        assert_eq!(parse_timestamp("20240301"), Some(day));
        assert_eq!(parse_timestamp("2024-03-01T00:00:00"), Some(day));
        assert_eq!(parse_timestamp("2024-03-01 00:00:01"), Some(day + 1));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn date_must_be_a_word_of_the_name() {
        let pick = |names: &[&str]| pick_key_column(names.iter().copied());
        assert_eq!(pick(&["LastUpdated", "v"]), None);
        assert_eq!(pick(&["Mandate", "v"]), None);
        assert_eq!(pick(&["v", "OrderDate"]), Some("OrderDate".to_string()));
        assert_eq!(pick(&["order_date"]), Some("order_date".to_string()));
        assert_eq!(pick(&["DATE"]), Some("DATE".to_string()));
        assert_eq!(pick(&["DateTime"]), Some("DateTime".to_string()));
        assert_eq!(pick(&["Date", "Month"]), Some("Month".to_string()));
    }

    #[test]
    fn updated_column_does_not_reorder_rows() {
        let ds = Dataset::from_json_value(json!([
            {"LastUpdated": "2024-03-01", "v": 1},
            {"LastUpdated": "2024-01-01", "v": 2},
            {"LastUpdated": "2024-02-01", "v": 3}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&ds, SchemaPolicy::Union);
        assert!(!ordering.is_keyed());
        assert_eq!(ordering.indices(), &[0, 1, 2]);
    }

    #[test]
    fn summary_columns_choose_the_key() {
        let ds = Dataset::from_json_value(json!([
            {"v": 1}, {"v": 2, "Month": "March"}, {"v": 3, "Month": "January"}
        ]))
        .unwrap();
        let hidden = crate::summary::summarize(&ds, SchemaPolicy::FirstRow);
        assert_eq!(RowOrdering::for_summary(&ds, &hidden), RowOrdering::natural(3));

        let visible = crate::summary::summarize(&ds, SchemaPolicy::Union);
        let ordering = RowOrdering::for_summary(&ds, &visible);
        assert_eq!(ordering.key_column(), Some("Month"));
        assert_eq!(ordering.indices(), &[2, 1, 0]);
    }

    #[test]
    fn month_column_orders_rows() {
        let ds = Dataset::from_json_value(json!([
            {"Month": "January", "Steps": 175025},
            {"Month": "October", "Steps": 299116},
            {"Month": "May", "Steps": 117887}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&ds, SchemaPolicy::Union);
        assert_eq!(ordering.key_column(), Some("Month"));
        assert_eq!(ordering.indices(), &[0, 2, 1]);
        assert_eq!(ordering.labels(), &["January", "May", "October"]);
        assert_eq!(
            ordering.series(&ds, "Steps"),
            vec![
                ("January".to_string(), 175025.0),
                ("May".to_string(), 117887.0),
                ("October".to_string(), 299116.0)
            ]
        );
    }

    #[test]
    fn numeric_months_get_names() {
        let ds = Dataset::from_json_value(json!([
            {"month": 3, "v": 1}, {"month": 1, "v": 2}, {"month": 2, "v": 3}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&ds, SchemaPolicy::Union);
        assert_eq!(ordering.indices(), &[1, 2, 0]);
        assert_eq!(ordering.labels(), &["January", "February", "March"]);
    }

    #[test]
    fn unkeyed_rows_trail_in_row_order() {
        let ds = Dataset::from_json_value(json!([
            {"Date": "2024-02-01", "v": 1},
            {"Date": null, "v": 2},
            {"Date": "2024-01-01", "v": 3},
            {"Date": "soon", "v": 4}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&ds, SchemaPolicy::Union);
        assert_eq!(ordering.indices(), &[2, 0, 1, 3]);
        assert_eq!(ordering.labels(), &["2024-01-01", "2024-02-01", "Row 2", "soon"]);
    }

    #[test]
    fn falls_back_to_row_order() {
        let ds = Dataset::from_json_value(json!([
            {"v": 3}, {"v": 1}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&ds, SchemaPolicy::Union);
        assert!(!ordering.is_keyed());
        assert_eq!(ordering.labels(), &["Row 1", "Row 2"]);

        let one_key = Dataset::from_json_value(json!([
            {"Month": "May", "v": 3}, {"Month": "later", "v": 1}
        ]))
        .unwrap();
        let ordering = RowOrdering::detect(&one_key, SchemaPolicy::Union);
        assert_eq!(ordering, RowOrdering::natural(2));
    }
}
