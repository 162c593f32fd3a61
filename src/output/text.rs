//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Aligned listings of tags, branches, assets and directory contents
//! - Metadata and update-check summaries with colors
//! - Forge errors rendered from their message

use crate::domain::{BranchMap, MetaRecord, RawResponse, ReleaseAsset};
use crate::forge::InstallRecord;
use crate::output::{OutputFormatter, Report, Verbosity};
use crate::update::CheckReport;
use colored::Colorize;
use std::io::Write;

/// Length of abbreviated commit hashes
const SHORT_HASH_LEN: usize = 10;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn label(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_pairs<'a>(
        &self,
        pairs: impl Iterator<Item = (&'a String, &'a String)> + Clone,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let width = pairs.clone().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in pairs {
            let key = format!("{:width$}", key, width = width);
            writeln!(writer, "  {} {} {}", self.label(&key), self.dim("→"), value)?;
        }
        Ok(())
    }

    fn format_meta(&self, meta: &MetaRecord, writer: &mut dyn Write) -> std::io::Result<()> {
        let visibility = match (meta.private, self.color) {
            (true, true) => "private".yellow().to_string(),
            (true, false) => "private".to_string(),
            (false, true) => "public".green().to_string(),
            (false, false) => "public".to_string(),
        };
        let updated = meta
            .last_updated_at()
            .map(|at| at.format("%Y/%m/%d %H:%M").to_string())
            .unwrap_or_else(|| meta.last_updated.clone());

        writeln!(writer, "  {}     {}", self.label("visibility"), visibility)?;
        writeln!(writer, "  {}   {}", self.label("last updated"), updated)?;
        writeln!(writer, "  {}       {}", self.label("watchers"), meta.watchers)?;
        writeln!(writer, "  {}          {}", self.label("forks"), meta.forks)?;
        writeln!(writer, "  {}    {}", self.label("open issues"), meta.open_issues)
    }

    fn format_branches(&self, branches: &BranchMap, writer: &mut dyn Write) -> std::io::Result<()> {
        let width = branches.keys().map(String::len).max().unwrap_or(0);
        for (name, info) in branches {
            let name = format!("{:width$}", name, width = width);
            let hash: String = info.commit_hash.chars().take(SHORT_HASH_LEN).collect();
            if self.verbosity == Verbosity::Verbose {
                writeln!(
                    writer,
                    "  {} {} {} {}",
                    self.label(&name),
                    self.dim(&hash),
                    self.dim(&info.commit_timestamp),
                    info.download
                )?;
            } else {
                writeln!(writer, "  {} {} {}", self.label(&name), self.dim(&hash), info.download)?;
            }
        }
        Ok(())
    }

    fn format_install(&self, record: &InstallRecord, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "  {}     {}", self.label("repo"), record.repo)?;
        writeln!(writer, "  {}   {}", self.label("branch"), record.branch)?;
        writeln!(writer, "  {} {}", self.label("download"), record.download_link)?;
        for slug in record.options.keys() {
            writeln!(writer, "  {}    {} ({})", self.label("token"), self.dim("stored"), slug)?;
        }
        Ok(())
    }

    fn format_check(&self, check: &CheckReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let derived = &check.derived;
        let newest = derived.newest_tag.as_deref().unwrap_or("(none)");
        let source = if derived.uses_tags { "tags" } else { "branch" };

        writeln!(writer, "{}", self.label(&check.slug))?;
        writeln!(writer, "  newest tag  {}", newest)?;
        writeln!(writer, "  installs    {} {}", derived.download_link, self.dim(&format!("({})", source)))?;
        writeln!(writer, "  rollbacks   {}", derived.rollback.len())?;
        if let Some(branches) = &derived.branches {
            writeln!(writer, "  branches    {}", branches.len())?;
        }
        if self.verbosity == Verbosity::Verbose {
            if let Some(meta) = &derived.meta {
                self.format_meta(meta, writer)?;
            }
            if !derived.rollback.is_empty() {
                writeln!(writer)?;
                self.format_pairs(derived.rollback.iter(), writer)?;
            }
        }

        for error in &check.errors {
            if self.color {
                writeln!(writer, "  {} {}", "✗".red(), error.red())?;
            } else {
                writeln!(writer, "  x {}", error)?;
            }
        }
        Ok(())
    }

    fn format_passthrough(&self, raw: &RawResponse, writer: &mut dyn Write) -> std::io::Result<()> {
        let message = raw
            .error_message()
            .unwrap_or_else(|| "unrecognized response".to_string());
        if self.color {
            writeln!(writer, "{} {}", "forge error:".red().bold(), message)
        } else {
            writeln!(writer, "forge error: {}", message)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        match report {
            Report::File { name, content } => {
                if self.verbosity == Verbosity::Verbose {
                    writeln!(writer, "{}", self.dim(&format!("==> {} <==", name)))?;
                }
                write!(writer, "{}", content)?;
                if !content.ends_with('\n') {
                    writeln!(writer)?;
                }
                Ok(())
            }
            Report::Tags(tags) => {
                if tags.is_empty() && self.verbosity != Verbosity::Quiet {
                    writeln!(writer, "{}", self.dim("No tags"))?;
                }
                for tag in tags {
                    writeln!(writer, "{}", tag)?;
                }
                Ok(())
            }
            Report::Meta(meta) => self.format_meta(meta, writer),
            Report::Branches(branches) => self.format_branches(branches, writer),
            Report::Assets(assets) => self.format_pairs(assets.iter(), writer),
            Report::Contents(listing) => {
                for dir in &listing.dirs {
                    let dir = format!("{}/", dir);
                    if self.color {
                        writeln!(writer, "{}", dir.blue().bold())?;
                    } else {
                        writeln!(writer, "{}", dir)?;
                    }
                }
                for file in &listing.files {
                    writeln!(writer, "{}", file)?;
                }
                Ok(())
            }
            Report::ReleaseAsset(ReleaseAsset::Unsupported) => {
                writeln!(writer, "{}", self.dim("Release assets are not supported by this forge"))
            }
            Report::DownloadLink(link) => writeln!(writer, "{}", link),
            Report::Install(record) => self.format_install(record, writer),
            Report::Check(check) => self.format_check(check, writer),
            Report::Passthrough(raw) => self.format_passthrough(raw, writer),
        }
    }
}
