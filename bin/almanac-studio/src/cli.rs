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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "almanac-studio", about = "Summaries and insights for tabular data")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Row, column and missing-value counts.
    Summary {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Outliers, trends, correlations, missing data and distributions.
    Insights {
        file: PathBuf,
        #[arg(long, value_name = "N")]
        top: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Plain-text analysis report.
    Report {
        file: PathBuf,
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Ask a question about the data.
    Ask { file: PathBuf, question: String },
    /// Write the dataset back out as CSV.
    Export {
        file: PathBuf,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
    /// Chart series and chart suggestions.
    Chart {
        file: PathBuf,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP server.
    Serve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["almanac-studio", "insights", "data.csv", "--top", "3"]);
        assert_eq!(
            cli.cmd,
            Some(Command::Insights {
                file: PathBuf::from("data.csv"),
                top: Some(3),
                json: false
            })
        );

        let cli = Cli::parse_from([
            "almanac-studio",
            "ask",
            "steps.json",
            "what is the average?",
            "--config",
            "almanac.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("almanac.toml")));
        assert!(matches!(cli.cmd, Some(Command::Ask { .. })));
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["almanac-studio"]);
        assert_eq!(cli.cmd, None);
    }

    #[test]
    fn export_requires_out() {
        assert!(Cli::try_parse_from(["almanac-studio", "export", "data.csv"]).is_err());
    }
}
