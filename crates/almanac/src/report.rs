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

//! Exports: the plain-text analysis report, CSV and JSON dumps, and the
//! compact digest that prefixes language-model prompts.

use crate::dataset::Dataset;
use crate::error::{AlmanacError, Result};
use crate::format::{format_grouped, format_number};
use crate::insights::Insight;
use crate::summary::{describe_column, Summary};
use chrono::NaiveDate;
use std::fmt;
use std::io::Write;
use tracing::debug;

/// The "Data Analysis Report" text. Rendered through `Display`.
pub struct TextReport<'a> {
    pub file_name: &'a str,
    pub summary: &'a Summary,
    pub insights: &'a [Insight],
    pub generated_on: NaiveDate,
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(title.len().max(13)))
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        writeln!(f, "Data Analysis Report")?;
        writeln!(f, "Generated: {}", self.generated_on.format("%Y-%m-%d"))?;
        writeln!(f, "Dataset: {}", self.file_name)?;
        writeln!(f)?;

        heading(f, "DATASET SUMMARY")?;
        writeln!(f, "Total Rows: {}", format_grouped(summary.total_rows as f64))?;
        writeln!(f, "Total Columns: {}", summary.total_columns)?;
        writeln!(f, "Numeric Columns: {}", summary.numeric_columns)?;
        writeln!(f, "Text Columns: {}", summary.text_columns)?;
        writeln!(f)?;

        heading(f, "KEY INSIGHTS")?;
        if self.insights.is_empty() {
            writeln!(f, "No insights found")?;
        }
        for (index, insight) in self.insights.iter().enumerate() {
            writeln!(f, "{}. {}", index + 1, insight.title)?;
            writeln!(f, "   {}", insight.description)?;
            writeln!(
                f,
                "   Confidence: {} ({:.2})",
                insight.confidence_level(),
                insight.confidence
            )?;
            if let Some(column) = &insight.column {
                writeln!(f, "   Column: {column}")?;
            }
            writeln!(f)?;
        }

        heading(f, "MISSING DATA")?;
        let missing = summary.columns_with_missing();
        if missing.is_empty() {
            writeln!(f, "No missing data detected")?;
        }
        for (column, count) in missing {
            writeln!(
                f,
                "{column}: {count} missing values ({}%)",
                summary.missing_percentage(count)
            )?;
        }
        writeln!(f)?;

        heading(f, "COLUMN TYPES")?;
        for (column, kind) in &summary.column_types {
            writeln!(f, "{column}: {kind}")?;
        }
        Ok(())
    }
}

pub fn render_text_report(
    file_name: &str,
    summary: &Summary,
    insights: &[Insight],
    generated_on: NaiveDate,
) -> String {
    TextReport {
        file_name,
        summary,
        insights,
        generated_on,
    }
    .to_string()
}

/// `insights_<stem>_report.txt`
pub fn report_file_name(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".csv")
        .or_else(|| file_name.strip_suffix(".json"))
        .unwrap_or(file_name);
    format!("insights_{stem}_report.txt")
}

/// Writes `columns` of every row as CSV. Missing cells are empty.
pub fn export_csv<W: Write>(dataset: &Dataset, columns: &[String], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns)?;
    for row in dataset.rows() {
        csv_writer.write_record(
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
        )?;
    }
    csv_writer.flush()?;
    debug!(rows = dataset.len(), columns = columns.len(), "dataset exported as CSV");
    Ok(())
}

pub fn export_summary_json(summary: &Summary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(|e| AlmanacError::Export(e.to_string()))
}

pub fn export_insights_json(insights: &[Insight]) -> Result<String> {
    serde_json::to_string_pretty(insights).map_err(|e| AlmanacError::Export(e.to_string()))
}

/// Compact plain-text description of a dataset for prompt context.
pub fn dataset_digest(
    dataset: &Dataset,
    summary: &Summary,
    insights: &[Insight],
    max_insights: usize,
) -> String {
    let mut lines = vec![format!("Dataset: {summary}")];
    let columns: Vec<String> = summary
        .column_types
        .iter()
        .map(|(c, t)| format!("{c} ({t})"))
        .collect();
    if !columns.is_empty() {
        lines.push(format!("Columns: {}", columns.join(", ")));
    }
    let missing: Vec<String> = summary
        .columns_with_missing()
        .into_iter()
        .map(|(c, n)| format!("{c}: {n} ({}%)", summary.missing_percentage(n)))
        .collect();
    lines.push(format!(
        "Missing values: {}",
        if missing.is_empty() {
            "none".to_string()
        } else {
            missing.join(", ")
        }
    ));
    let stats: Vec<String> = summary
        .numeric_column_names()
        .into_iter()
        .filter_map(|c| {
            let s = describe_column(dataset, c)?;
            Some(format!(
                "- {c}: mean {}, median {}, min {}, max {}",
                format_number(s.mean),
                format_number(s.median),
                format_number(s.min),
                format_number(s.max)
            ))
        })
        .collect();
    if !stats.is_empty() {
        lines.push("Numeric columns:".to_string());
        lines.extend(stats);
    }
    if !insights.is_empty() && max_insights > 0 {
        lines.push("Top insights:".to_string());
        for (i, insight) in insights.iter().take(max_insights).enumerate() {
            lines.push(format!(
                "{}. [{}] {}: {}",
                i + 1,
                insight.kind,
                insight.title,
                insight.description
            ));
        }
    }
    lines.join("\n")
}
