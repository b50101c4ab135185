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

//! Tabular data analysis.
//!
//! Turns loosely-typed row records into a structural [`Summary`] and a list
//! of human-readable [`Insight`]s. Everything runs synchronously on the
//! calling thread and nothing is cached between calls; see
//! [`session::Workspace`] for per-dataset memoisation.

pub mod analyser;
pub mod assistant;
pub mod chart;
pub mod classifier;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod insights;
pub mod ordering;
pub mod report;
pub mod session;
pub mod summary;
pub mod value;

pub use analyser::{Analysis, DatasetAnalyser};
pub use assistant::{DataAssistant, Intent};
pub use chart::{chart_series, chart_suggestions, ChartKind, ChartSeries, ChartSuggestion};
pub use classifier::{classify, ColumnType};
pub use columns::{ColumnValueOptions, ColumnValues};
pub use config::AnalysisConfig;
pub use dataset::{Dataset, Row, SchemaPolicy};
pub use error::{AlmanacError, ConfigError, ErrorReporter, ErrorSeverity, Result};
pub use insights::{
    ConfidenceLevel, DetectionContext, Detector, Insight, InsightGenerator, InsightType,
};
pub use ordering::RowOrdering;
pub use session::{View, Workspace};
pub use summary::{describe_column, summarize, ColumnStats, Summary};
pub use value::Value;

/// Summary with the default column discovery policy.
pub fn get_data_summary(dataset: &Dataset) -> Summary {
    summarize(dataset, SchemaPolicy::default())
}

/// Insights with the default detector chain and thresholds.
pub fn generate_data_insights(dataset: &Dataset) -> Vec<Insight> {
    InsightGenerator::new().generate(dataset)
}

pub fn get_numeric_columns(dataset: &Dataset) -> Vec<String> {
    columns::numeric_columns(dataset, SchemaPolicy::default())
}

pub fn get_column_values(
    dataset: &Dataset,
    column: &str,
    options: ColumnValueOptions,
) -> ColumnValues {
    columns::get_column_values(dataset, column, options)
}
