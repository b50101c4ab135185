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
use crate::format::format_grouped;
use crate::summary::describe_column;

/// Mean, median and range for every numeric column.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionDetector;

impl Detector for DistributionDetector {
    fn name(&self) -> &'static str {
        "distribution"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        ctx.numeric_columns()
            .into_iter()
            .filter_map(|column| {
                let stats = describe_column(ctx.dataset, column)?;
                // Few points make a weak summary.
                let confidence = if stats.count >= ctx.config.min_points { 0.6 } else { 0.3 };
                Some(
                    Insight::new(
                        InsightType::Distribution,
                        format!("Distribution of {column}"),
                        format!(
                            "{column} averages {} (median {}) and ranges from {} to {}.",
                            format_grouped(stats.mean),
                            format_grouped(stats.median),
                            format_grouped(stats.min),
                            format_grouped(stats.max)
                        ),
                        confidence,
                    )
                    .for_column(column)
                    .with_value(stats.mean),
                )
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
    fn describes_each_numeric_column() {
        let ds = Dataset::from_json_value(json!([
            {"Month": "January", "Steps": 175025},
            {"Month": "October", "Steps": 299116},
            {"Month": "May", "Steps": 117887}
        ]))
        .unwrap();
        let config = AnalysisConfig::default();
        let summary = summarize(&ds, config.schema_policy);
        let insights = DistributionDetector.detect(&DetectionContext::new(&ds, &summary, &config));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].column.as_deref(), Some("Steps"));
        assert_eq!(
            insights[0].description,
            "Steps averages 197,342.67 (median 175,025) and ranges from 117,887 to 299,116."
        );
        assert_eq!(insights[0].confidence, 0.6);
    }
}
