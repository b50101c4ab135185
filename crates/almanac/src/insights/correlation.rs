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
use crate::dataset::Dataset;
use crate::value::Value;

/// Pearson's r. `None` when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;
    let y_mean = ys[..n].iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Values of `a` and `b` from the rows where both are finite.
pub fn paired_values(dataset: &Dataset, a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let x = row.get(a).and_then(Value::as_finite_f64)?;
            let y = row.get(b).and_then(Value::as_finite_f64)?;
            Some((x, y))
        })
        .unzip()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationDetector;

impl Detector for CorrelationDetector {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let columns = ctx.numeric_columns();
        let mut pairs = Vec::new();
        for (i, a) in columns.iter().enumerate() {
            for b in &columns[i + 1..] {
                let (xs, ys) = paired_values(ctx.dataset, a, b);
                if xs.len() < ctx.config.min_points {
                    continue;
                }
                if let Some(r) = pearson(&xs, &ys) {
                    if r.abs() >= ctx.config.min_correlation {
                        pairs.push((*a, *b, r));
                    }
                }
            }
        }
        // Stable: equal strengths keep pair order.
        pairs.sort_by(|x, y| y.2.abs().total_cmp(&x.2.abs()));
        pairs
            .into_iter()
            .map(|(a, b, r)| {
                let strength = if r.abs() >= 0.9 { "Very strong" } else { "Strong" };
                let (sign, relation) = if r > 0.0 {
                    ("positive", "tend to rise together")
                } else {
                    ("negative", "tend to move in opposite directions")
                };
                Insight::new(
                    InsightType::Correlation,
                    format!("{strength} {sign} correlation between {a} and {b}"),
                    format!("{a} and {b} {relation} (r = {r:.2})."),
                    r.abs(),
                )
                .for_columns(&[a, b])
                .with_value(r)
            })
            .collect()
    }
}
