//! Output formatting for adapter results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing
//! - The Report type every CLI command produces

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::{
    AssetMap, BranchMap, ContentListing, MetaRecord, RawResponse, ReleaseAsset, TagList,
};
use crate::forge::InstallRecord;
use crate::update::CheckReport;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color: true,
        }
    }
}

/// What a command produced
#[derive(Debug, Clone)]
pub enum Report {
    /// Raw file contents
    File { name: String, content: String },
    /// Release tag names
    Tags(TagList),
    /// Repository metadata
    Meta(MetaRecord),
    /// Branches with download links
    Branches(BranchMap),
    /// Asset name to download URL
    Assets(AssetMap),
    /// Root directory listing
    Contents(ContentListing),
    /// Release asset lookup
    ReleaseAsset(ReleaseAsset),
    /// Archive download link
    DownloadLink(String),
    /// Resolved remote install
    Install(InstallRecord),
    /// Update check outcome
    Check(CheckReport),
    /// Forge error returned unmodified
    Passthrough(RawResponse),
}

impl Report {
    /// Whether the report carries a forge error
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Report::Passthrough(_))
            || matches!(self, Report::Check(check) if !check.is_clean())
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write a report
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
    }
}
