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

//! Offline subcommands. Each returns the text to print.

use crate::cli::Command;
use crate::config::StudioConfig;
use almanac::chart::chart_suggestions;
use almanac::report::{export_csv, export_insights_json, export_summary_json};
use almanac::{Dataset, DatasetAnalyser, Workspace};
use anyhow::{bail, Context, Result};
use serde_json::json;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Reads `path` into a fresh workspace configured from `config`.
pub fn load_workspace(path: &Path, config: &StudioConfig) -> Result<Workspace> {
    let analyser = DatasetAnalyser::with_config(config.analysis.clone())?;
    let dataset = Dataset::from_path(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut workspace = Workspace::with_analyser(analyser);
    workspace.load(dataset, file_name);
    Ok(workspace)
}

pub fn execute(command: &Command, config: &StudioConfig) -> Result<String> {
    match command {
        Command::Summary { file, json } => {
            let ws = load_workspace(file, config)?;
            if *json {
                Ok(export_summary_json(ws.summary())?)
            } else {
                Ok(render_summary(&ws))
            }
        }
        Command::Insights { file, top, json } => {
            let ws = load_workspace(file, config)?;
            let insights = ws.insights();
            let shown = &insights[..top.unwrap_or(insights.len()).min(insights.len())];
            if *json {
                Ok(export_insights_json(shown)?)
            } else {
                Ok(render_insights(shown))
            }
        }
        Command::Report { file, out } => {
            let ws = load_workspace(file, config)?;
            let report = ws.report(chrono::Local::now().date_naive());
            match out {
                Some(path) => {
                    std::fs::write(path, &report)
                        .with_context(|| format!("writing report to {}", path.display()))?;
                    info!(path = %path.display(), "report written");
                    Ok(format!("Report written to {}", path.display()))
                }
                None => Ok(report),
            }
        }
        Command::Ask { file, question } => {
            let ws = load_workspace(file, config)?;
            Ok(ws.assistant().answer(question))
        }
        Command::Export { file, out } => {
            let ws = load_workspace(file, config)?;
            let columns: Vec<String> = ws.summary().column_names().map(str::to_string).collect();
            let writer = BufWriter::new(
                File::create(out).with_context(|| format!("creating {}", out.display()))?,
            );
            export_csv(ws.dataset(), &columns, writer)?;
            Ok(format!(
                "Exported {} rows to {}",
                ws.dataset().len(),
                out.display()
            ))
        }
        Command::Chart { file, all, json } => {
            let ws = load_workspace(file, config)?;
            let series = ws.chart(*all);
            let suggestions = chart_suggestions(ws.summary());
            if *json {
                let body = json!({ "series": series, "suggestions": suggestions });
                return Ok(serde_json::to_string_pretty(&body)?);
            }
            if series.is_empty() {
                return Ok("No numeric columns to chart.".to_string());
            }
            let mut out = format!("name\t{}\n", series.columns.join("\t"));
            for point in &series.points {
                let values: Vec<String> = point.values.values().map(|v| v.to_string()).collect();
                let _ = writeln!(out, "{}\t{}", point.name, values.join("\t"));
            }
            out.push_str("\nSuggested charts:\n");
            for s in &suggestions {
                let _ = writeln!(out, "- {} ({}): {}", s.kind, s.columns.join(", "), s.reason);
            }
            Ok(out)
        }
        Command::Serve => bail!("serve runs the HTTP server and has no text output"),
    }
}

fn render_summary(ws: &Workspace) -> String {
    let summary = ws.summary();
    let mut out = format!(
        "{}: {summary}\n",
        ws.file_name().unwrap_or("dataset")
    );
    for (column, kind) in &summary.column_types {
        let _ = write!(out, "  {column}: {kind}");
        match summary.missing_values.get(column) {
            Some(&n) if n > 0 => {
                let _ = writeln!(out, " ({n} missing, {}%)", summary.missing_percentage(n));
            }
            _ => out.push('\n'),
        }
    }
    out
}

fn render_insights(insights: &[almanac::Insight]) -> String {
    if insights.is_empty() {
        return "No insights found".to_string();
    }
    let mut out = String::new();
    for (i, insight) in insights.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] {} ({}, {:.2})\n   {}",
            i + 1,
            insight.kind,
            insight.title,
            insight.confidence_level(),
            insight.confidence,
            insight.description
        );
    }
    out
}
