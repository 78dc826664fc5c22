// ABOUTME: Output format abstraction for rendering engine results
// ABOUTME: Supports human-readable text (default) and pretty-printed JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Output Format Abstraction Layer
//!
//! Every result printed by `mise-cli` is both `Serialize` (for JSON) and
//! [`TextReport`] (for operators reading a terminal).
//!
//! ## Supported Formats
//!
//! - **Text**: Aligned tables and issue lists
//! - **JSON**: Pretty-printed, stable field names

mod text;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Output serialization format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Get the format name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: {other} (expected text or json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable rendering of a result
pub trait TextReport {
    /// Render as plain text
    fn render_text(&self) -> String;
}

/// Error type for formatting operations
#[derive(Debug, Clone)]
pub struct FormatError {
    /// Error message describing what went wrong
    pub message: String,
    /// The format that was being used when the error occurred
    pub format: OutputFormat,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Format error ({}): {}", self.format, self.message)
    }
}

impl std::error::Error for FormatError {}

/// Render `data` in `format`
///
/// # Errors
///
/// Returns `FormatError` if JSON serialization fails
pub fn format_output<T>(data: &T, format: OutputFormat) -> Result<String, FormatError>
where
    T: Serialize + TextReport + ?Sized,
{
    match format {
        OutputFormat::Text => Ok(data.render_text()),
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| FormatError {
            message: e.to_string(),
            format,
        }),
    }
}
