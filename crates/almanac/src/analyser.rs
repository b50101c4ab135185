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

use crate::columns::{get_column_values, numeric_columns, ColumnValueOptions, ColumnValues};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::insights::{Insight, InsightGenerator};
use crate::summary::{summarize, Summary};
use serde::{Deserialize, Serialize};

/// Summary and insights computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: Summary,
    pub insights: Vec<Insight>,
}

/// The engine operations bound to one [`AnalysisConfig`].
#[derive(Debug, Default)]
pub struct DatasetAnalyser {
    generator: InsightGenerator,
}
impl DatasetAnalyser {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            generator: InsightGenerator::with_config(config)?,
        })
    }
    pub fn from_generator(generator: InsightGenerator) -> Self {
        Self { generator }
    }
    pub fn config(&self) -> &AnalysisConfig {
        self.generator.config()
    }

    pub fn summarize(&self, dataset: &Dataset) -> Summary {
        summarize(dataset, self.config().schema_policy)
    }
    pub fn generate(&self, dataset: &Dataset) -> Vec<Insight> {
        self.generator.generate(dataset)
    }
    pub fn generate_with_summary(&self, dataset: &Dataset, summary: &Summary) -> Vec<Insight> {
        self.generator.generate_with_summary(dataset, summary)
    }
    pub fn analyse(&self, dataset: &Dataset) -> Analysis {
        let summary = self.summarize(dataset);
        let insights = self.generate_with_summary(dataset, &summary);
        Analysis { summary, insights }
    }
    pub fn numeric_columns(&self, dataset: &Dataset) -> Vec<String> {
        numeric_columns(dataset, self.config().schema_policy)
    }
    pub fn column_values(
        &self,
        dataset: &Dataset,
        column: &str,
        options: ColumnValueOptions,
    ) -> ColumnValues {
        get_column_values(dataset, column, options)
    }
}
