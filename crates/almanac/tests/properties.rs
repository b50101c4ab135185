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

use almanac::{
    generate_data_insights, get_data_summary, ColumnType, Dataset, Row, Value as Cell,
};
use proptest::prelude::*;

const COLUMNS: [&str; 4] = ["a", "b", "c", "d"];

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Null),
        any::<bool>().prop_map(Cell::Bool),
        (-1000i32..1000).prop_map(|n| Cell::Number(f64::from(n))),
        any::<f64>().prop_map(Cell::Number),
        "[a-z]{0,5}".prop_map(Cell::Text),
    ]
}

fn row() -> impl Strategy<Value = Row> {
    prop::collection::vec((0usize..COLUMNS.len(), cell()), 0..5).prop_map(|cells| {
        let mut row = Row::new();
        for (column, value) in cells {
            row.insert(COLUMNS[column].to_string(), value);
        }
        row
    })
}

fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(row(), 0..12).prop_map(Dataset::new)
}

proptest! {
    #[test]
    fn test_total_rows_matches_length(ds in dataset()) {
        prop_assert_eq!(get_data_summary(&ds).total_rows, ds.len());
    }

    #[test]
    fn test_numeric_iff_some_finite_number(ds in dataset()) {
        let summary = get_data_summary(&ds);
        for (column, kind) in &summary.column_types {
            let has_finite = ds
                .rows()
                .iter()
                .any(|r| r.get(column).and_then(Cell::as_finite_f64).is_some());
            prop_assert_eq!(*kind == ColumnType::Numeric, has_finite);
        }
        prop_assert_eq!(
            summary.numeric_columns + summary.text_columns,
            summary.total_columns
        );
    }

    #[test]
    fn test_missing_counts_absent_or_null(ds in dataset()) {
        let summary = get_data_summary(&ds);
        for (column, count) in &summary.missing_values {
            let expected = ds
                .rows()
                .iter()
                .filter(|r| r.get(column).map_or(true, |v| v.is_missing()))
                .count();
            prop_assert_eq!(*count, expected);
            prop_assert!(*count <= summary.total_rows);
        }
    }

    #[test]
    fn test_insights_are_deterministic(ds in dataset()) {
        let first = generate_data_insights(&ds);
        let again = generate_data_insights(&ds);
        let from_clone = generate_data_insights(&ds.clone());
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &from_clone);
        for insight in &first {
            prop_assert!((0.0..=1.0).contains(&insight.confidence));
        }
    }

    #[test]
    fn test_generation_leaves_input_untouched(ds in dataset()) {
        let before = format!("{ds:?}");
        let _ = generate_data_insights(&ds);
        let _ = get_data_summary(&ds);
        prop_assert_eq!(before, format!("{ds:?}"));
    }
}
