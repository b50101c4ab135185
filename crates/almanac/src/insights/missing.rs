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

use super::{DetectionContext, Detector, Insight, InsightType};
use crate::format::plural;

/// One warning per column with null or absent cells, in discovery order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingDataDetector;

impl Detector for MissingDataDetector {
    fn name(&self) -> &'static str {
        "missing"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        ctx.summary
            .columns_with_missing()
            .into_iter()
            .map(|(column, count)| {
                Insight::new(
                    InsightType::Missing,
                    format!("Missing values in {column}"),
                    format!(
                        "{column} has {count} missing {} ({}% of rows).",
                        plural(count, "value", "values"),
                        ctx.summary.missing_percentage(count)
                    ),
                    1.0,
                )
                .for_column(column)
                .with_value(count as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::dataset::Dataset;
    use crate::summary::summarize;
    use serde_json::json;

    #[test]
    fn one_null_in_three_rows() {
        let ds = Dataset::from_json_value(json!([{"A": 1}, {"A": null}, {"A": 3}])).unwrap();
        let config = AnalysisConfig::default();
        let summary = summarize(&ds, config.schema_policy);
        let insights = MissingDataDetector.detect(&DetectionContext::new(&ds, &summary, &config));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Missing values in A");
        assert_eq!(insights[0].description, "A has 1 missing value (33.3% of rows).");
        assert_eq!(insights[0].value, Some(1.0));
        assert_eq!(insights[0].confidence, 1.0);
    }

    #[test]
    fn complete_columns_are_silent_and_order_is_kept() {
        let ds = Dataset::from_json_value(json!([
            {"a": 1, "b": null, "c": 2},
            {"a": 2, "c": null},
            {"a": 3, "b": "x", "c": null}
        ]))
        .unwrap();
        let config = AnalysisConfig::default();
        let summary = summarize(&ds, config.schema_policy);
        let insights = MissingDataDetector.detect(&DetectionContext::new(&ds, &summary, &config));
        let columns: Vec<_> = insights.iter().filter_map(|i| i.column.as_deref()).collect();
        assert_eq!(columns, vec!["b", "c"]);
        assert!(insights[0].description.contains("2 missing values (66.7% of rows)"));
    }
}
