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

//! Deterministic question answering over engine output.
//!
//! Questions are routed by keyword to an [`Intent`]; every answer is built
//! from the summary, the insights and column statistics only.

use crate::chart::chart_suggestions;
use crate::dataset::Dataset;
use crate::format::format_grouped;
use crate::insights::{Insight, InsightType};
use crate::ordering::RowOrdering;
use crate::summary::{describe_column, Summary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Overview,
    Charts,
    Trends,
    Outliers,
    Missing,
    Columns,
    Average,
    Total,
    Maximum,
    Minimum,
    Help,
}
impl Intent {
    /// First matching keyword group wins. A trailing `*` marks a word stem.
    pub fn classify(question: &str) -> Self {
        let words = question_words(question);
        let any = |keywords: &[&str]| keywords.iter().any(|k| has_keyword(&words, k));
        if any(&["summar*", "overview"]) {
            Intent::Overview
        } else if any(&["chart*", "visualiz*", "visualis*", "plot*", "graph*"]) {
            Intent::Charts
        } else if any(&["trend*", "pattern*"]) {
            Intent::Trends
        } else if any(&["outlier*", "unusual", "anomal*"]) {
            Intent::Outliers
        } else if any(&["missing", "incomplete", "gaps"]) {
            Intent::Missing
        } else if any(&["column*", "field*"]) {
            Intent::Columns
        } else if any(&["average*", "mean"]) {
            Intent::Average
        } else if any(&["total*", "sum", "overall"]) {
            Intent::Total
        } else if any(&["most", "max", "maximum", "highest", "largest"]) {
            Intent::Maximum
        } else if any(&["least", "min", "minimum", "lowest", "smallest"]) {
            Intent::Minimum
        } else {
            Intent::Help
        }
    }
}

/// Lowercase alphanumeric words.
fn question_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn has_keyword(words: &[String], keyword: &str) -> bool {
    match keyword.strip_suffix('*') {
        Some(stem) => words.iter().any(|w| w.starts_with(stem)),
        None => words.iter().any(|w| w == keyword),
    }
}

/// At most this many columns are reported when none is named.
const REPORTED_COLUMNS: usize = 3;

pub struct DataAssistant<'a> {
    dataset: &'a Dataset,
    summary: &'a Summary,
    insights: &'a [Insight],
}
impl<'a> DataAssistant<'a> {
    pub fn new(dataset: &'a Dataset, summary: &'a Summary, insights: &'a [Insight]) -> Self {
        Self {
            dataset,
            summary,
            insights,
        }
    }

    pub fn answer(&self, question: &str) -> String {
        let intent = Intent::classify(question);
        match intent {
            Intent::Overview => self.overview(),
            Intent::Charts => self.charts(),
            Intent::Trends => self.trends(),
            Intent::Outliers => self.outliers(),
            Intent::Missing => self.missing(),
            Intent::Columns => self.columns(),
            Intent::Average | Intent::Total | Intent::Maximum | Intent::Minimum => {
                self.statistic(intent, question)
            }
            Intent::Help => self.help(),
        }
    }

    /// Numeric column whose name appears in the question as whole words,
    /// case-insensitive. The longest name wins; ties go to the first column.
    pub fn mentioned_column(&self, question: &str) -> Option<&'a str> {
        let words = question_words(question);
        self.summary
            .numeric_column_names()
            .into_iter()
            .filter(|c| {
                let name = question_words(c);
                !name.is_empty() && words.windows(name.len()).any(|w| w == name.as_slice())
            })
            .rev()
            .max_by_key(|c| c.len())
    }

    fn insights_of(&self, kinds: &[InsightType]) -> Vec<&'a Insight> {
        self.insights
            .iter()
            .filter(|i| kinds.contains(&i.kind))
            .collect()
    }

    fn overview(&self) -> String {
        let s = self.summary;
        let numeric = s.numeric_column_names();
        let mut out = format!(
            "Dataset overview:\n- {} total rows\n- {} columns ({} numeric, {} text)\n",
            format_grouped(s.total_rows as f64),
            s.total_columns,
            s.numeric_columns,
            s.text_columns
        );
        if !numeric.is_empty() {
            let key: Vec<_> = numeric.iter().take(REPORTED_COLUMNS).copied().collect();
            out.push_str(&format!("- Key numeric columns: {}\n", key.join(", ")));
        }
        if self.insights.is_empty() {
            out.push_str("\nNo notable findings yet.");
        } else {
            out.push_str("\nTop insights:\n");
            let top: Vec<String> = self
                .insights
                .iter()
                .take(3)
                .map(|i| format!("- {}: {}", i.title, i.description))
                .collect();
            out.push_str(&top.join("\n"));
        }
        out
    }

    fn charts(&self) -> String {
        let suggestions = chart_suggestions(self.summary);
        if suggestions.is_empty() {
            return "There are no numeric columns to chart. Load data with numeric values to see charts."
                .to_string();
        }
        let lines: Vec<String> = suggestions
            .iter()
            .map(|s| format!("- {} chart of {}: {}", s.kind, s.columns.join(" vs "), s.reason))
            .collect();
        format!("Suggested charts for this data:\n{}", lines.join("\n"))
    }

    fn trends(&self) -> String {
        let found = self.insights_of(&[InsightType::Trend, InsightType::Correlation]);
        if found.is_empty() {
            return format!(
                "No clear trends or correlations stand out. The dataset has {} numeric {} to compare over time or against each other.",
                self.summary.numeric_columns,
                crate::format::plural(self.summary.numeric_columns, "column", "columns")
            );
        }
        let lines: Vec<String> = found
            .iter()
            .map(|i| format!("- {}: {}", i.title, i.description))
            .collect();
        format!("Patterns in your data:\n{}", lines.join("\n"))
    }

    fn outliers(&self) -> String {
        let found = self.insights_of(&[InsightType::Outlier]);
        if found.is_empty() {
            return "No outliers were detected in the numeric columns.".to_string();
        }
        let lines: Vec<String> = found
            .iter()
            .map(|i| format!("- {}: {}", i.title, i.description))
            .collect();
        format!("Outliers detected:\n{}", lines.join("\n"))
    }

    fn missing(&self) -> String {
        let missing = self.summary.columns_with_missing();
        if missing.is_empty() {
            return format!(
                "The dataset is complete: no missing values across all {} columns.",
                self.summary.total_columns
            );
        }
        let lines: Vec<String> = missing
            .into_iter()
            .map(|(c, n)| {
                format!(
                    "- {c}: {n} missing {} ({}%)",
                    crate::format::plural(n, "value", "values"),
                    self.summary.missing_percentage(n)
                )
            })
            .collect();
        format!("Missing data found:\n{}", lines.join("\n"))
    }

    fn columns(&self) -> String {
        let s = self.summary;
        format!(
            "The dataset has {} columns.\nNumeric ({}): {}\nText ({}): {}",
            s.total_columns,
            s.numeric_columns,
            s.numeric_column_names().join(", "),
            s.text_columns,
            s.text_column_names().join(", ")
        )
    }

    fn statistic(&self, intent: Intent, question: &str) -> String {
        let noun = match intent {
            Intent::Average => "average",
            Intent::Total => "total",
            Intent::Maximum => "highest value",
            _ => "lowest value",
        };
        if self.dataset.is_empty() {
            return format!("No data is loaded, so there is no {noun} to report.");
        }
        let numeric = self.summary.numeric_column_names();
        if numeric.is_empty() {
            return format!("There are no numeric columns to compute the {noun} of.");
        }
        let columns: Vec<&str> = match self.mentioned_column(question) {
            Some(column) => vec![column],
            None => numeric.into_iter().take(REPORTED_COLUMNS).collect(),
        };
        let lines: Vec<String> = columns
            .iter()
            .filter_map(|c| self.statistic_line(intent, c))
            .collect();
        match lines.as_slice() {
            [] => format!("No numeric values were found to compute the {noun}."),
            [single] if columns.len() == 1 => single.clone(),
            _ => format!("The {noun} for each numeric column:\n{}", lines.join("\n")),
        }
    }

    fn statistic_line(&self, intent: Intent, column: &str) -> Option<String> {
        let stats = describe_column(self.dataset, column)?;
        let line = match intent {
            Intent::Average => format!(
                "- {column}: average {} (n={})",
                format_grouped(stats.mean),
                stats.count
            ),
            Intent::Total => format!(
                "- {column}: total {} (n={})",
                format_grouped(stats.sum),
                stats.count
            ),
            _ => {
                let target = if intent == Intent::Maximum {
                    stats.max
                } else {
                    stats.min
                };
                let ordering = RowOrdering::for_summary(self.dataset, self.summary);
                let at = ordering
                    .series(self.dataset, column)
                    .into_iter()
                    .find(|(_, v)| *v == target)
                    .map(|(label, _)| format!(" ({label})"))
                    .unwrap_or_default();
                let word = if intent == Intent::Maximum { "highest" } else { "lowest" };
                format!("- {column}: {word} {}{at}", format_grouped(target))
            }
        };
        Some(line)
    }

    fn help(&self) -> String {
        format!(
            "I can answer questions about this dataset of {} rows and {} columns. Try asking:\n- \"Give me a summary of this data\"\n- \"What patterns do you see?\"\n- \"Are there any outliers?\"\n- \"Is any data missing?\"\n- \"What charts should I create?\"\n- \"What is the average of a column?\"",
            format_grouped(self.summary.total_rows as f64),
            self.summary.total_columns
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SchemaPolicy;
    use crate::insights::InsightGenerator;
    use crate::summary::summarize;
    use serde_json::json;

    fn fixture() -> (Dataset, Summary, Vec<Insight>) {
        let ds = Dataset::from_json_value(json!([
            {"Month": "January", "Steps": 175025, "Calories": 2000},
            {"Month": "October", "Steps": 299116, "Calories": null},
            {"Month": "May", "Steps": 117887, "Calories": 2400}
        ]))
        .unwrap();
        let summary = summarize(&ds, SchemaPolicy::Union);
        let insights = InsightGenerator::new().generate(&ds);
        (ds, summary, insights)
    }

    #[test]
    fn keyword_routing() {
        assert_eq!(Intent::classify("Give me a summary"), Intent::Overview);
        assert_eq!(Intent::classify("What should I visualize?"), Intent::Charts);
        assert_eq!(Intent::classify("any patterns?"), Intent::Trends);
        assert_eq!(Intent::classify("Unusual values?"), Intent::Outliers);
        assert_eq!(Intent::classify("is data incomplete"), Intent::Missing);
        assert_eq!(Intent::classify("list the fields"), Intent::Columns);
        assert_eq!(Intent::classify("average steps"), Intent::Average);
        assert_eq!(Intent::classify("what's the overall count"), Intent::Total);
        assert_eq!(Intent::classify("when did I walk the most"), Intent::Maximum);
        assert_eq!(Intent::classify("least active month"), Intent::Minimum);
        assert_eq!(Intent::classify("hello"), Intent::Help);
    }

    #[test]
    fn keywords_match_whole_words() {
        assert_eq!(Intent::classify("I almost gave up"), Intent::Help);
        assert_eq!(Intent::classify("energy consumption"), Intent::Help);
        assert_eq!(Intent::classify("what's the sum of b"), Intent::Total);
        assert_eq!(Intent::classify("averages please"), Intent::Average);
    }

    #[test]
    fn short_column_names_match_as_words() {
        let ds = Dataset::from_json_value(json!([
            {"a": 1, "b": 100, "b total": 5},
            {"a": 2, "b": 200, "b total": 6},
            {"a": 3, "b": 300, "b total": 7}
        ]))
        .unwrap();
        let summary = summarize(&ds, SchemaPolicy::Union);
        let insights = InsightGenerator::new().generate(&ds);
        let assistant = DataAssistant::new(&ds, &summary, &insights);
        assert_eq!(assistant.mentioned_column("what is the average of b?"), Some("b"));
        assert_eq!(
            assistant.answer("what is the average of b?"),
            "- b: average 200 (n=3)"
        );
        assert_eq!(assistant.mentioned_column("average of B Total"), Some("b total"));
        assert_eq!(assistant.mentioned_column("what is the mean?"), None);
    }

    #[test]
    fn extremes_use_the_visible_key_column() {
        let ds = Dataset::from_json_value(json!([
            {"v": 1}, {"v": 2, "Month": "March"}, {"v": 3, "Month": "January"}
        ]))
        .unwrap();
        let summary = summarize(&ds, SchemaPolicy::FirstRow);
        let assistant = DataAssistant::new(&ds, &summary, &[]);
        assert_eq!(assistant.answer("highest v"), "- v: highest 3 (Row 3)");

        let summary = summarize(&ds, SchemaPolicy::Union);
        let assistant = DataAssistant::new(&ds, &summary, &[]);
        assert_eq!(assistant.answer("highest v"), "- v: highest 3 (January)");
    }

    #[test]
    fn named_column_gets_a_single_answer() {
        let (ds, summary, insights) = fixture();
        let assistant = DataAssistant::new(&ds, &summary, &insights);
        assert_eq!(assistant.mentioned_column("total STEPS please"), Some("Steps"));
        assert_eq!(
            assistant.answer("What is the total steps?"),
            "- Steps: total 592,028 (n=3)"
        );
        assert_eq!(
            assistant.answer("average calories"),
            "- Calories: average 2,200 (n=2)"
        );
    }

    #[test]
    fn extremes_carry_their_label() {
        let (ds, summary, insights) = fixture();
        let assistant = DataAssistant::new(&ds, &summary, &insights);
        assert_eq!(
            assistant.answer("Which month had the most steps?"),
            "- Steps: highest 299,116 (October)"
        );
        assert_eq!(
            assistant.answer("least steps"),
            "- Steps: lowest 117,887 (May)"
        );
    }

    #[test]
    fn unnamed_column_reports_several() {
        let (ds, summary, insights) = fixture();
        let answer = DataAssistant::new(&ds, &summary, &insights).answer("averages?");
        assert!(answer.starts_with("The average for each numeric column:\n"));
        assert!(answer.contains("- Steps: average 197,342.67 (n=3)"));
        assert!(answer.contains("- Calories: average 2,200 (n=2)"));
    }

    #[test]
    fn missing_and_overview_use_engine_output() {
        let (ds, summary, insights) = fixture();
        let assistant = DataAssistant::new(&ds, &summary, &insights);
        assert_eq!(
            assistant.answer("anything missing?"),
            "Missing data found:\n- Calories: 1 missing value (33.3%)"
        );
        let overview = assistant.answer("overview");
        assert!(overview.contains("- 3 total rows"));
        assert!(overview.contains("Key numeric columns: Steps, Calories"));
    }

    #[test]
    fn empty_dataset_answers_gracefully() {
        let ds = Dataset::empty();
        let summary = summarize(&ds, SchemaPolicy::Union);
        let assistant = DataAssistant::new(&ds, &summary, &[]);
        assert_eq!(
            assistant.answer("average"),
            "No data is loaded, so there is no average to report."
        );
        assert!(assistant.answer("outliers").starts_with("No outliers"));
        assert!(assistant.answer("charts").starts_with("There are no numeric columns"));
        assert!(assistant.answer("hi").contains("0 rows and 0 columns"));
    }
}
