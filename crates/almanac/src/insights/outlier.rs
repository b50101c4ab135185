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
use crate::columns::indexed_numeric_values;
use crate::format::{format_number, plural};

/// Flags values more than `outlier_std_multiplier` population standard
/// deviations from the column mean. One insight per column, naming the most
/// extreme value.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlierDetector;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlierScan {
    pub mean: f64,
    pub std_dev: f64,
    /// 0-based dataset row of the most extreme value.
    pub row: usize,
    pub value: f64,
    pub z_score: f64,
    pub flagged: usize,
}

/// `None` when there are too few points, no spread, or nothing beyond the threshold.
pub fn scan(values: &[(usize, f64)], multiplier: f64, min_points: usize) -> Option<OutlierScan> {
    if values.len() < min_points.max(1) {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|(_, v)| v).sum::<f64>() / n;
    let variance = values.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if !std_dev.is_finite() || std_dev <= 1e-12 {
        return None;
    }
    let threshold = multiplier * std_dev;
    let flagged = values
        .iter()
        .filter(|(_, v)| (v - mean).abs() > threshold)
        .count();
    if flagged == 0 {
        return None;
    }
    let mut extreme = values[0];
    for &(row, value) in &values[1..] {
        if (value - mean).abs() > (extreme.1 - mean).abs() {
            extreme = (row, value);
        }
    }
    Some(OutlierScan {
        mean,
        std_dev,
        row: extreme.0,
        value: extreme.1,
        z_score: (extreme.1 - mean).abs() / std_dev,
        flagged,
    })
}

impl Detector for OutlierDetector {
    fn name(&self) -> &'static str {
        "outlier"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let k = ctx.config.outlier_std_multiplier;
        ctx.numeric_columns()
            .into_iter()
            .filter_map(|column| {
                let values = indexed_numeric_values(ctx.dataset, column);
                let found = scan(&values, k, ctx.config.min_points)?;
                let direction = if found.value > found.mean { "above" } else { "below" };
                let description = format!(
                    "{column} has {} {} beyond {} standard deviations. The most extreme is {} at row {}, {:.1} standard deviations {direction} the mean of {}.",
                    found.flagged,
                    plural(found.flagged, "value", "values"),
                    format_number(k),
                    format_number(found.value),
                    found.row + 1,
                    found.z_score,
                    format_number(found.mean),
                );
                let confidence = (found.z_score / (2.0 * k)).clamp(0.5, 1.0);
                Some(
                    Insight::new(
                        InsightType::Outlier,
                        format!("Outlier detected in {column}"),
                        description,
                        confidence,
                    )
                    .for_column(column)
                    .with_value(found.value),
                )
            })
            .collect()
    }
}
