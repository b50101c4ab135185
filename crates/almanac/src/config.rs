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

use crate::dataset::SchemaPolicy;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Thresholds for the insight detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_policy: SchemaPolicy,
    /// Values further than this many standard deviations from the mean are outliers.
    pub outlier_std_multiplier: f64,
    pub min_trend_r_squared: f64,
    /// Share of steps that must move in the dominant direction.
    pub min_trend_consistency: f64,
    pub min_correlation: f64,
    /// Fewest finite values a column needs before any statistical detector looks at it.
    pub min_points: usize,
    pub include_distribution: bool,
    pub max_insights: Option<usize>,
}
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::Union,
            outlier_std_multiplier: 1.5,
            min_trend_r_squared: 0.6,
            min_trend_consistency: 0.8,
            min_correlation: 0.7,
            min_points: 3,
            include_distribution: true,
            max_insights: None,
        }
    }
}
impl AnalysisConfig {
    pub fn strict() -> Self {
        Self {
            outlier_std_multiplier: 2.5,
            min_trend_r_squared: 0.8,
            min_trend_consistency: 0.9,
            min_correlation: 0.85,
            min_points: 5,
            include_distribution: false,
            ..Default::default()
        }
    }
    pub fn for_small_datasets() -> Self {
        Self {
            outlier_std_multiplier: 1.2,
            min_trend_r_squared: 0.5,
            min_trend_consistency: 0.75,
            min_correlation: 0.6,
            min_points: 3,
            ..Default::default()
        }
    }
    pub fn with_schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.schema_policy = policy;
        self
    }
    pub fn with_max_insights(mut self, max: usize) -> Self {
        self.max_insights = Some(max);
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.outlier_std_multiplier.is_finite() || self.outlier_std_multiplier <= 0.0 {
            return Err(out_of_range("outlier_std_multiplier", self.outlier_std_multiplier));
        }
        for (field, value) in [
            ("min_trend_r_squared", self.min_trend_r_squared),
            ("min_trend_consistency", self.min_trend_consistency),
            ("min_correlation", self.min_correlation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(out_of_range(field, value));
            }
        }
        if self.min_points < 3 {
            return Err(ConfigError::ValidationFailed {
                reason: format!("min_points must be at least 3, got {}", self.min_points),
            });
        }
        if self.max_insights == Some(0) {
            return Err(ConfigError::ValidationFailed {
                reason: "max_insights must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }
}
fn out_of_range(field: &str, value: f64) -> ConfigError {
    ConfigError::OutOfRange {
        field: field.to_string(),
        value: value.to_string(),
    }
}
