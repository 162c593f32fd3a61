//! Gitea response normalization
//!
//! Every normalizer first checks [`RawResponse::is_error`]; error responses
//! are handed back untouched so the host can show the forge's own message.
//! Unexpected shapes are treated as empty, never as failures.

use crate::domain::{
    AssetMap, BranchInfo, BranchMap, ContentListing, MetaRecord, Normalized, RawResponse, TagList,
};
use serde_json::Value;
use tracing::debug;

static NULL: Value = Value::Null;

/// Borrow the decoded JSON, or return the passthrough
macro_rules! json_or_passthrough {
    ($raw:expr) => {{
        let raw = $raw.decode();
        if raw.is_error() {
            return Normalized::Passthrough(raw);
        }
        match raw {
            RawResponse::Json(value) => value,
            // decode() leaves only Json or Failure, and Failure is an error
            other => return Normalized::Passthrough(other),
        }
    }};
}

/// Entries of a list response; anything else counts as empty
fn entries(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => &[],
    }
}

fn str_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

fn count_field(entry: &Value, key: &str) -> u64 {
    entry.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Release list to tag names, in response order
pub fn normalize_tags(raw: RawResponse) -> Normalized<TagList> {
    let value = json_or_passthrough!(raw);

    let tags = entries(&value)
        .iter()
        .filter_map(|release| str_field(release, "tag_name"))
        .map(str::to_string)
        .collect();
    Normalized::Canonical(tags)
}

/// Repository object to meta record
pub fn normalize_meta(raw: RawResponse) -> Normalized<MetaRecord> {
    let value = json_or_passthrough!(raw);

    let repo = match &value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    };

    Normalized::Canonical(MetaRecord {
        private: repo.get("private").and_then(Value::as_bool).unwrap_or(false),
        last_updated: str_field(repo, "updated_at").unwrap_or_default().to_string(),
        watchers: count_field(repo, "watchers_count"),
        forks: count_field(repo, "forks_count"),
        open_issues: count_field(repo, "open_issues_count"),
    })
}

/// Branch list to branch map.
///
/// `download_link` receives each branch name and must return its archive
/// link; links in the response itself are never used.
pub fn normalize_branches<F>(raw: RawResponse, download_link: F) -> Normalized<BranchMap>
where
    F: Fn(&str) -> String,
{
    let value = json_or_passthrough!(raw);
    if value.is_string() {
        debug!("branch listing returned a string, treating as empty repository");
    }

    let mut branches = BranchMap::new();
    for entry in entries(&value) {
        let Some(name) = str_field(entry, "name").filter(|n| !n.trim().is_empty()) else {
            continue;
        };
        let commit = entry.get("commit").unwrap_or(&NULL);
        branches.insert(
            name.to_string(),
            BranchInfo {
                download: download_link(name),
                commit_hash: str_field(commit, "id").unwrap_or_default().to_string(),
                commit_timestamp: str_field(commit, "timestamp").unwrap_or_default().to_string(),
            },
        );
    }
    Normalized::Canonical(branches)
}

/// Directory listing split into file and directory names
pub fn normalize_contents(raw: RawResponse) -> Normalized<ContentListing> {
    let value = json_or_passthrough!(raw);

    let mut listing = ContentListing::default();
    for entry in entries(&value) {
        let Some(name) = str_field(entry, "name") else {
            continue;
        };
        match str_field(entry, "type") {
            Some("file") => {
                listing.files.insert(name.to_string());
            }
            Some("dir") => {
                listing.dirs.insert(name.to_string());
            }
            _ => {}
        }
    }
    Normalized::Canonical(listing)
}

/// Asset directory listing to name → download URL
pub fn normalize_assets(raw: RawResponse) -> Normalized<AssetMap> {
    let value = json_or_passthrough!(raw);

    let assets = entries(&value)
        .iter()
        .filter_map(|entry| {
            let name = str_field(entry, "name")?;
            let url = str_field(entry, "download_url")?;
            Some((name.to_string(), url.to_string()))
        })
        .collect();
    Normalized::Canonical(assets)
}

/// Raw file contents (plugin headers, readme, changelog)
pub fn normalize_file(raw: RawResponse) -> Normalized<String> {
    match raw {
        RawResponse::Text(text) => Normalized::Canonical(text),
        RawResponse::Json(Value::String(text)) => Normalized::Canonical(text),
        other if other.is_error() => Normalized::Passthrough(other),
        RawResponse::Json(value) => Normalized::Canonical(value.to_string()),
        failure @ RawResponse::Failure(_) => Normalized::Passthrough(failure),
    }
}

/// Changelog parsing.
///
/// Gitea serves changelogs as raw files, so there is no API payload to
/// decode and this always returns `None`; callers use the raw text from
/// the file endpoint instead.
pub fn normalize_changelog(_raw: &RawResponse) -> Option<String> {
    None
}
