//! JSON output formatter for machine processing
//!
//! Canonical records are written in their serialized shape. Forge errors
//! keep the payload the forge sent so scripts can inspect it.

use crate::domain::RawResponse;
use crate::output::{OutputFormatter, Report, Verbosity};
use crate::update::CheckReport;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Convert a forge error to JSON, keeping its payload
    fn passthrough_to_json(raw: &RawResponse) -> Value {
        match raw {
            RawResponse::Json(value) => json!({ "error": raw.error_message(), "payload": value }),
            RawResponse::Text(text) => json!({ "error": null, "payload": text }),
            RawResponse::Failure(err) => json!({
                "error": raw.error_message(),
                "transport": err.to_string(),
                "payload": err.payload(),
            }),
        }
    }

    /// Branches and metadata are only included in verbose mode
    fn check_to_json(&self, check: &CheckReport) -> serde_json::Result<Value> {
        if self.verbosity == Verbosity::Verbose {
            return serde_json::to_value(check);
        }
        let mut brief = check.clone();
        brief.derived.branches = None;
        brief.derived.meta = None;
        serde_json::to_value(brief)
    }

    fn to_value<T: Serialize>(value: &T) -> serde_json::Result<Value> {
        serde_json::to_value(value)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let value = match report {
            Report::File { name, content } => Ok(json!({ "file": name, "content": content })),
            Report::Tags(tags) => Self::to_value(tags),
            Report::Meta(meta) => Self::to_value(meta),
            Report::Branches(branches) => Self::to_value(branches),
            Report::Assets(assets) => Self::to_value(assets),
            Report::Contents(listing) => Self::to_value(listing),
            Report::ReleaseAsset(asset) => Self::to_value(asset),
            Report::DownloadLink(link) => Ok(json!({ "download_link": link })),
            Report::Install(record) => Self::to_value(record),
            Report::Check(check) => self.check_to_json(check),
            Report::Passthrough(raw) => Ok(Self::passthrough_to_json(raw)),
        }
        .map_err(std::io::Error::other)?;

        let json = if self.verbosity == Verbosity::Quiet {
            serde_json::to_string(&value)
        } else {
            serde_json::to_string_pretty(&value)
        }
        .map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BranchInfo, BranchMap, MetaRecord, ReleaseAsset};
    use crate::error::TransportError;
    use crate::update::DerivedFields;

    fn render(report: &Report, verbosity: Verbosity) -> Value {
        let formatter = JsonFormatter::new(verbosity);
        let mut output = Vec::new();
        formatter.format(report, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    fn check_report() -> CheckReport {
        let mut branches = BranchMap::new();
        branches.insert(
            "main".to_string(),
            BranchInfo {
                download: "https://git.example.com/api/v1/repos/acme/widget/archive/main.zip"
                    .to_string(),
                commit_hash: "abc".to_string(),
                commit_timestamp: "2024-01-01T00:00:00Z".to_string(),
            },
        );
        CheckReport {
            slug: "widget".to_string(),
            derived: DerivedFields {
                newest_tag: Some("v1.2.0".to_string()),
                uses_tags: true,
                download_link: "https://git.example.com/api/v1/repos/acme/widget/archive/v1.2.0.zip"
                    .to_string(),
                branches: Some(branches),
                meta: Some(MetaRecord::default()),
                ..DerivedFields::default()
            },
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_json_formatter_new() {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        assert_eq!(formatter.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_format_tags() {
        let parsed = render(
            &Report::Tags(vec!["v1.2.0".to_string(), "v1.1.0".to_string()]),
            Verbosity::Normal,
        );
        assert_eq!(parsed, json!(["v1.2.0", "v1.1.0"]));
    }

    #[test]
    fn test_format_release_asset() {
        let parsed = render(&Report::ReleaseAsset(ReleaseAsset::Unsupported), Verbosity::Normal);
        assert_eq!(parsed["status"], "unsupported");
    }

    #[test]
    fn test_format_check_brief() {
        let parsed = render(&Report::Check(check_report()), Verbosity::Normal);
        assert_eq!(parsed["slug"], "widget");
        assert_eq!(parsed["derived"]["newest_tag"], "v1.2.0");
        assert!(parsed["derived"].get("branches").is_none());
        assert!(parsed.get("errors").is_none());
    }

    #[test]
    fn test_format_check_verbose() {
        let parsed = render(&Report::Check(check_report()), Verbosity::Verbose);
        assert_eq!(parsed["derived"]["branches"]["main"]["commit_hash"], "abc");
        assert_eq!(parsed["derived"]["meta"]["watchers"], 0);
    }

    #[test]
    fn test_format_passthrough_keeps_payload() {
        let payload = json!({"message": "Not Found", "url": "https://git.example.com/api/swagger"});
        let parsed = render(&Report::Passthrough(RawResponse::Json(payload.clone())), Verbosity::Normal);
        assert_eq!(parsed["error"], "Not Found");
        assert_eq!(parsed["payload"], payload);
    }

    #[test]
    fn test_format_transport_failure() {
        let raw = RawResponse::Failure(TransportError::timeout("https://git.example.com"));
        let parsed = render(&Report::Passthrough(raw), Verbosity::Quiet);
        assert!(parsed["transport"].as_str().unwrap().contains("git.example.com"));
        assert!(parsed["payload"].is_null());
    }
}
