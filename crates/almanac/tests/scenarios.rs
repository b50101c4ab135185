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
    generate_data_insights, get_column_values, get_data_summary, get_numeric_columns,
    AnalysisConfig, ColumnType, ColumnValueOptions, Dataset, DatasetAnalyser, InsightType,
    SchemaPolicy,
};
use serde_json::json;
use std::io::Write;

#[test]
fn test_monthly_steps_summary() {
    let ds = Dataset::from_json_value(json!([
        {"Month": "January", "Steps": 175025},
        {"Month": "October", "Steps": 299116},
        {"Month": "May", "Steps": 117887}
    ]))
    .unwrap();
    let summary = get_data_summary(&ds);
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.numeric_columns, 1);
    assert_eq!(summary.text_columns, 1);
    assert_eq!(summary.column_types["Month"], ColumnType::Text);
    assert_eq!(summary.column_types["Steps"], ColumnType::Numeric);
    assert_eq!(summary.missing_values["Month"], 0);
    assert_eq!(summary.missing_values["Steps"], 0);
    assert_eq!(get_numeric_columns(&ds), vec!["Steps"]);
    assert_eq!(
        get_column_values(&ds, "Steps", ColumnValueOptions::numeric()).as_numbers(),
        Some(&[175025.0, 299116.0, 117887.0][..])
    );
}

#[test]
fn test_single_null_is_reported_missing() {
    let ds = Dataset::from_json_str(r#"[{"A": 1}, {"A": null}, {"A": 3}]"#).unwrap();
    let summary = get_data_summary(&ds);
    assert_eq!(summary.missing_values["A"], 1);
    assert_eq!(summary.column_types["A"], ColumnType::Numeric);

    let insights = generate_data_insights(&ds);
    let missing = insights
        .iter()
        .find(|i| i.kind == InsightType::Missing)
        .expect("missing insight");
    assert_eq!(missing.column.as_deref(), Some("A"));
    assert_eq!(missing.value, Some(1.0));
    assert!(missing.description.contains("1 missing value"));
    assert!(missing.description.contains("33.3%"));
}

#[test]
fn test_empty_dataset() {
    let ds = Dataset::from_json_str("[]").unwrap();
    let summary = get_data_summary(&ds);
    assert_eq!(summary.total_rows, 0);
    assert_eq!(summary.total_columns, 0);
    assert_eq!(summary.numeric_columns, 0);
    assert_eq!(summary.text_columns, 0);
    assert!(summary.column_types.is_empty());
    assert!(summary.missing_values.is_empty());
    assert!(generate_data_insights(&ds).is_empty());
}

#[test]
fn test_spike_is_an_outlier() {
    let ds = Dataset::from_json_value(json!([
        {"Value": 10}, {"Value": 10}, {"Value": 10}, {"Value": 10}, {"Value": 1000}
    ]))
    .unwrap();
    let insights = generate_data_insights(&ds);
    let outlier = insights
        .iter()
        .find(|i| i.kind == InsightType::Outlier)
        .expect("outlier insight");
    assert_eq!(outlier.column.as_deref(), Some("Value"));
    assert_eq!(outlier.value, Some(1000.0));
    assert!(outlier.description.contains("1000"));
    assert_eq!(insights[0].kind, InsightType::Outlier);
}

#[test]
fn test_detector_output_order() {
    let ds = Dataset::from_json_value(json!([
        {"Month": "Jan", "Sales": 100, "Ads": 10, "Note": "a"},
        {"Month": "Feb", "Sales": 200, "Ads": 20, "Note": null},
        {"Month": "Mar", "Sales": 300, "Ads": 30, "Note": "c"},
        {"Month": "Apr", "Sales": 400, "Ads": 40, "Note": "d"}
    ]))
    .unwrap();
    let kinds: Vec<InsightType> = generate_data_insights(&ds).iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            InsightType::Trend,
            InsightType::Trend,
            InsightType::Correlation,
            InsightType::Missing,
            InsightType::Distribution,
            InsightType::Distribution,
        ]
    );
}

#[test]
fn test_schema_policies_disagree_on_late_columns() {
    let ds = Dataset::from_json_value(json!([
        {"a": 1},
        {"a": 2, "late": 7},
        {"a": 3}
    ]))
    .unwrap();
    let union = DatasetAnalyser::new().summarize(&ds);
    assert_eq!(union.total_columns, 2);
    assert_eq!(union.column_types["late"], ColumnType::Numeric);
    assert_eq!(union.missing_values["late"], 2);

    let first_row = DatasetAnalyser::with_config(
        AnalysisConfig::default().with_schema_policy(SchemaPolicy::FirstRow),
    )
    .unwrap();
    let summary = first_row.summarize(&ds);
    assert_eq!(summary.total_columns, 1);
    assert!(!summary.missing_values.contains_key("late"));
    assert!(first_row
        .generate(&ds)
        .iter()
        .all(|i| !i.involves("late")));
}

#[test]
fn test_unreadable_input_is_invalid_input() {
    for input in [r#"{"a": 1}"#, "[1, 2]", r#"[{"a": {"b": 1}}]"#] {
        let err = Dataset::from_json_str(input).unwrap_err();
        assert!(err.is_invalid_input(), "{input}: {err}");
    }
    assert!(!Dataset::from_json_str("not json").unwrap_err().is_invalid_input());
}

#[test]
fn test_loads_csv_and_json_files() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("steps.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "Month,Steps\nJanuary,175025\nMay,\nOctober,299116").unwrap();
    let ds = Dataset::from_path(&csv_path).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(get_data_summary(&ds).missing_values["Steps"], 1);

    let json_path = dir.path().join("steps.json");
    std::fs::write(&json_path, r#"[{"Month": "May", "Steps": 10}]"#).unwrap();
    assert_eq!(get_numeric_columns(&Dataset::from_path(&json_path).unwrap()), vec!["Steps"]);
}
