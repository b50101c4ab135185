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
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}
impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

/// Least-squares line over the point index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// `None` for fewer than two points or a flat series.
pub fn fit_line(values: &[f64]) -> Option<LineFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if syy <= f64::EPSILON * y_mean.abs().max(1.0) || sxy == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let r_squared = sxy * sxy / (sxx * syy);
    if !slope.is_finite() || !r_squared.is_finite() {
        return None;
    }
    Some(LineFit {
        slope,
        intercept: y_mean - slope * x_mean,
        r_squared: r_squared.clamp(0.0, 1.0),
    })
}

/// Share of consecutive steps that move in `direction`.
pub fn step_consistency(values: &[f64], direction: TrendDirection) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let aligned = values
        .windows(2)
        .filter(|w| match direction {
            TrendDirection::Increasing => w[1] > w[0],
            TrendDirection::Decreasing => w[1] < w[0],
        })
        .count();
    aligned as f64 / (values.len() - 1) as f64
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendDetector;

impl Detector for TrendDetector {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let config = ctx.config;
        let mut insights = Vec::new();
        for column in ctx.numeric_columns() {
            let series = ctx.ordering.series(ctx.dataset, column);
            if series.len() < config.min_points {
                continue;
            }
            let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
            let Some(fit) = fit_line(&values) else {
                continue;
            };
            let direction = if fit.slope > 0.0 {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            };
            let consistency = step_consistency(&values, direction);
            if fit.r_squared < config.min_trend_r_squared && consistency < config.min_trend_consistency
            {
                continue;
            }
            let (first_label, first) = &series[0];
            let (last_label, last) = &series[series.len() - 1];
            let change = last - first;
            let agrees = match direction {
                TrendDirection::Increasing => change > 0.0,
                TrendDirection::Decreasing => change < 0.0,
            };
            if !agrees {
                continue;
            }
            let (verb, noun, title) = match direction {
                TrendDirection::Increasing => ("rose", "increase", "Upward trend"),
                TrendDirection::Decreasing => ("fell", "decrease", "Downward trend"),
            };
            let percent = (*first != 0.0).then(|| change / first.abs() * 100.0);
            let mut description = format!(
                "{column} {verb} from {} ({first_label}) to {} ({last_label}) across {} points",
                format_grouped(*first),
                format_grouped(*last),
                series.len()
            );
            if let Some(pct) = percent {
                description.push_str(&format!(", a {:.1}% {noun}", pct.abs()));
            }
            description.push('.');
            let mut insight = Insight::new(
                InsightType::Trend,
                format!("{title} in {column}"),
                description,
                fit.r_squared.max(consistency),
            )
            .for_column(column);
            if let Some(pct) = percent {
                insight = insight.with_value(pct);
            }
            insights.push(insight);
        }
        insights
    }
}
