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

//! Insight generation.
//!
//! Each finding comes from a [`Detector`]. The [`InsightGenerator`] runs a
//! fixed chain of detectors and concatenates what they report; the order of
//! the chain is the order of the output.

pub mod correlation;
pub mod distribution;
pub mod missing;
pub mod outlier;
pub mod trend;

pub use correlation::CorrelationDetector;
pub use distribution::DistributionDetector;
pub use missing::MissingDataDetector;
pub use outlier::OutlierDetector;
pub use trend::TrendDetector;

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::ConfigResult;
use crate::ordering::RowOrdering;
use crate::summary::{summarize, Summary};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Outlier,
    Trend,
    Correlation,
    Missing,
    Distribution,
}
impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Outlier => "outlier",
            InsightType::Trend => "trend",
            InsightType::Correlation => "correlation",
            InsightType::Missing => "missing",
            InsightType::Distribution => "distribution",
        }
    }
}
impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}
impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}
impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One human-readable finding about a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    /// Strength of the finding in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}
impl Insight {
    pub fn new(
        kind: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            title: title.into(),
            description: description.into(),
            kind,
            confidence,
            column: None,
            columns: Vec::new(),
            value: None,
        }
    }
    pub fn for_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self.columns = vec![column.to_string()];
        self
    }
    /// The first column becomes the primary one.
    pub fn for_columns(mut self, columns: &[&str]) -> Self {
        self.column = columns.first().map(|c| c.to_string());
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value.is_finite().then_some(value);
        self
    }
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
    pub fn involves(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Everything a detector may look at. Built once per generation run.
#[derive(Debug)]
pub struct DetectionContext<'a> {
    pub dataset: &'a Dataset,
    pub summary: &'a Summary,
    pub config: &'a AnalysisConfig,
    pub ordering: RowOrdering,
}
impl<'a> DetectionContext<'a> {
    pub fn new(dataset: &'a Dataset, summary: &'a Summary, config: &'a AnalysisConfig) -> Self {
        Self {
            dataset,
            summary,
            config,
            ordering: RowOrdering::detect(dataset, config.schema_policy),
        }
    }
    pub fn numeric_columns(&self) -> Vec<&'a str> {
        self.summary.numeric_column_names()
    }
}

pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight>;
}

pub fn default_detectors(config: &AnalysisConfig) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = vec![
        Box::new(OutlierDetector),
        Box::new(TrendDetector),
        Box::new(CorrelationDetector),
        Box::new(MissingDataDetector),
    ];
    if config.include_distribution {
        detectors.push(Box::new(DistributionDetector));
    }
    detectors
}

pub struct InsightGenerator {
    config: AnalysisConfig,
    detectors: Vec<Box<dyn Detector>>,
}
impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Debug for InsightGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightGenerator")
            .field("config", &self.config)
            .field("detectors", &self.detector_names())
            .finish()
    }
}
impl InsightGenerator {
    pub fn new() -> Self {
        let config = AnalysisConfig::default();
        Self {
            detectors: default_detectors(&config),
            config,
        }
    }
    pub fn with_config(config: AnalysisConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            detectors: default_detectors(&config),
            config,
        })
    }
    /// A custom chain; detectors run in the order given.
    pub fn with_detectors(
        config: AnalysisConfig,
        detectors: Vec<Box<dyn Detector>>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, detectors })
    }
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn generate(&self, dataset: &Dataset) -> Vec<Insight> {
        let summary = summarize(dataset, self.config.schema_policy);
        self.generate_with_summary(dataset, &summary)
    }

    /// Same as [`Self::generate`] for callers that already hold the summary.
    pub fn generate_with_summary(&self, dataset: &Dataset, summary: &Summary) -> Vec<Insight> {
        if dataset.is_empty() {
            return Vec::new();
        }
        let ctx = DetectionContext::new(dataset, summary, &self.config);
        let mut insights = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(&ctx);
            debug!(detector = detector.name(), count = found.len(), "detector finished");
            insights.extend(found);
        }
        if let Some(max) = self.config.max_insights {
            insights.truncate(max);
        }
        debug!(insights = insights.len(), "insights generated");
        insights
    }
}
