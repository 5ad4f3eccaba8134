//! Output reporters for CI reports
//!
//! Supports:
//! - `markdown` - GitHub-flavored Markdown (report file and PR comment)
//! - `json` - Machine-readable JSON
//! - `text` - Terminal summary with colors

mod json;
mod markdown;
mod text;

use crate::models::CiReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: markdown, json, text",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Render a report in the specified format
pub fn report(report: &CiReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(report: &CiReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => markdown::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Text => text::render(report),
    }
}
