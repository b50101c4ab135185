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

use thiserror::Error;

/// Errors raised at the engine boundary.
///
/// Malformed *data* never produces an error; the engine degrades to empty
/// results instead. Only input that cannot be read as a dataset at all, or
/// a broken configuration, ends up here.
#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Export failed: {0}")]
    Export(String),
}
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: String, value: String },
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}
pub type Result<T> = std::result::Result<T, AlmanacError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl AlmanacError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AlmanacError::InvalidInput(message.into())
    }
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AlmanacError::InvalidInput(_))
    }
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AlmanacError::InvalidInput(_) | AlmanacError::Csv(_) | AlmanacError::Json(_)
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            AlmanacError::InvalidInput(_) => "Input",
            AlmanacError::Io(_) => "I/O",
            AlmanacError::Csv(_) => "CSV",
            AlmanacError::Json(_) => "JSON",
            AlmanacError::Config(_) => "Configuration",
            AlmanacError::Export(_) => "Export",
        }
    }
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AlmanacError::InvalidInput(_) | AlmanacError::Csv(_) | AlmanacError::Json(_) => {
                ErrorSeverity::Warning
            }
            AlmanacError::Config(_) => ErrorSeverity::Critical,
            AlmanacError::Io(_) | AlmanacError::Export(_) => ErrorSeverity::Error,
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            AlmanacError::InvalidInput(_) | AlmanacError::Json(_) => vec![
                "Provide a JSON array of row objects, e.g. [{\"Month\": \"May\", \"Steps\": 100}]"
                    .to_string(),
                "Nested arrays or objects are not supported as cell values".to_string(),
            ],
            AlmanacError::Csv(_) => vec![
                "Check that the first line of the file is a header row".to_string(),
                "Quote cells that contain commas or line breaks".to_string(),
            ],
            AlmanacError::Io(_) => vec!["Check the file path and its permissions".to_string()],
            AlmanacError::Config(_) => {
                vec!["Thresholds must be finite and within their documented range".to_string()]
            }
            AlmanacError::Export(_) => {
                vec!["Check that the output location is writable".to_string()]
            }
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            AlmanacError::InvalidInput(_) | AlmanacError::Json(_) | AlmanacError::Csv(_) => {
                format!("This file could not be read as a dataset. {self}")
            }
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
    pub fn color_code(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "\x1b[36m",
            ErrorSeverity::Warning => "\x1b[33m",
            ErrorSeverity::Error => "\x1b[31m",
            ErrorSeverity::Critical => "\x1b[35m",
        }
    }
}

/// Renders an [`AlmanacError`] for a terminal.
pub struct ErrorReporter {
    pub show_suggestions: bool,
    pub colored_output: bool,
}
impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
            colored_output: true,
        }
    }
    pub fn plain() -> Self {
        Self {
            show_suggestions: true,
            colored_output: false,
        }
    }
    pub fn report(&self, error: &AlmanacError) -> String {
        let severity = error.severity();
        let mut output = String::new();
        if self.colored_output {
            output.push_str(severity.color_code());
        }
        output.push_str(&format!(
            "[{}] {}: {}\n",
            severity.as_str(),
            error.category(),
            error.user_message()
        ));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        if self.show_suggestions {
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                output.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    output.push_str(&format!("  • {suggestion}\n"));
                }
            }
        }
        output
    }
}
impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_a_recoverable_warning() {
        let err = AlmanacError::invalid_input("expected an array of row objects");
        assert!(err.is_invalid_input());
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.category(), "Input");
        assert_eq!(
            err.to_string(),
            "Invalid input: expected an array of row objects"
        );
    }

    #[test]
    fn plain_report_lists_suggestions_without_colour() {
        let err = AlmanacError::Config(ConfigError::OutOfRange {
            field: "min_correlation".into(),
            value: "1.5".into(),
        });
        let report = ErrorReporter::plain().report(&err);
        assert!(report.starts_with("[CRITICAL] Configuration:"));
        assert!(report.contains("min_correlation is out of range: 1.5"));
        assert!(report.contains("Suggestions:"));
        assert!(!report.contains("\x1b["));
    }
}
