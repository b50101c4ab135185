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

//! Application state for a front end: the loaded dataset, the active view,
//! and analysis results cached per loaded dataset.

use crate::analyser::DatasetAnalyser;
use crate::assistant::DataAssistant;
use crate::chart::{chart_series, ChartSeries};
use crate::dataset::Dataset;
use crate::error::AlmanacError;
use crate::insights::Insight;
use crate::report::{dataset_digest, render_text_report};
use crate::summary::Summary;
use chrono::NaiveDate;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Overview,
    Data,
    Charts,
    Insights,
    Chat,
}
impl View {
    pub const ALL: [View; 5] = [
        View::Overview,
        View::Data,
        View::Charts,
        View::Insights,
        View::Chat,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Data => "data",
            View::Charts => "charts",
            View::Insights => "insights",
            View::Chat => "chat",
        }
    }
}
impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for View {
    type Err = AlmanacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        View::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| AlmanacError::invalid_input(format!("unknown view '{s}'")))
    }
}

/// Single owner of front-end state. All setters are synchronous; summary
/// and insights are computed at most once per loaded dataset.
#[derive(Debug, Default)]
pub struct Workspace {
    analyser: DatasetAnalyser,
    dataset: Dataset,
    file_name: Option<String>,
    generation: u64,
    active_view: View,
    summary: OnceCell<Summary>,
    insights: OnceCell<Vec<Insight>>,
}
impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_analyser(analyser: DatasetAnalyser) -> Self {
        Self {
            analyser,
            ..Default::default()
        }
    }

    pub fn navigate(&mut self, view: View) {
        debug!(from = %self.active_view, to = %view, "navigate");
        self.active_view = view;
    }

    /// Replaces the dataset and drops cached results. The view returns to
    /// the overview.
    pub fn load(&mut self, dataset: Dataset, file_name: impl Into<String>) {
        self.dataset = dataset;
        self.file_name = Some(file_name.into());
        self.invalidate();
        self.active_view = View::Overview;
        debug!(generation = self.generation, rows = self.dataset.len(), "dataset loaded");
    }

    pub fn reset(&mut self) {
        self.dataset = Dataset::empty();
        self.file_name = None;
        self.invalidate();
        self.active_view = View::Overview;
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.summary = OnceCell::new();
        self.insights = OnceCell::new();
    }

    pub fn active_view(&self) -> View {
        self.active_view
    }
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
    pub fn has_data(&self) -> bool {
        !self.dataset.is_empty()
    }
    /// Bumped by every `load` and `reset`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
    pub fn analyser(&self) -> &DatasetAnalyser {
        &self.analyser
    }

    pub fn summary(&self) -> &Summary {
        self.summary
            .get_or_init(|| self.analyser.summarize(&self.dataset))
    }
    pub fn insights(&self) -> &[Insight] {
        self.insights.get_or_init(|| {
            self.analyser
                .generate_with_summary(&self.dataset, self.summary())
        })
    }
    pub fn is_cached(&self) -> bool {
        self.summary.get().is_some() && self.insights.get().is_some()
    }

    pub fn chart(&self, show_all: bool) -> ChartSeries {
        chart_series(&self.dataset, self.summary(), show_all)
    }
    pub fn assistant(&self) -> DataAssistant<'_> {
        DataAssistant::new(&self.dataset, self.summary(), self.insights())
    }
    pub fn digest(&self, max_insights: usize) -> String {
        dataset_digest(&self.dataset, self.summary(), self.insights(), max_insights)
    }
    pub fn report(&self, generated_on: NaiveDate) -> String {
        render_text_report(
            self.file_name().unwrap_or("dataset"),
            self.summary(),
            self.insights(),
            generated_on,
        )
    }
}
