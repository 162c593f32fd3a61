//! Canonical records handed back to the update host
//!
//! These shapes are forge-agnostic: every backend adapter normalizes its
//! own JSON into them.

use crate::domain::ForgeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Raw tag names in the order the forge returned them
pub type TagList = Vec<String>;

/// Asset filename to direct download URL
pub type AssetMap = BTreeMap<String, String>;

/// Branch name to its download link and head commit
pub type BranchMap = BTreeMap<String, BranchInfo>;

/// Tag name to its archive download URL, used for rollbacks
pub type RollbackMap = BTreeMap<String, String>;

/// Repository metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Whether the repository is private
    pub private: bool,
    /// Timestamp of the last update, as sent by the forge
    pub last_updated: String,
    /// Number of watchers
    pub watchers: u64,
    /// Number of forks
    pub forks: u64,
    /// Number of open issues (0 when the forge omits it)
    pub open_issues: u64,
}

impl MetaRecord {
    /// Parse `last_updated` as an RFC 3339 timestamp
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_updated)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Download link and head commit of one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Archive URL, always computed by the download link builder
    pub download: String,
    /// Head commit id
    pub commit_hash: String,
    /// Head commit timestamp
    pub commit_timestamp: String,
}

/// Files and directories at one path of the repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentListing {
    /// Entries of type `file`
    pub files: BTreeSet<String>,
    /// Entries of type `dir`
    pub dirs: BTreeSet<String>,
}

/// Access credentials resolved for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Forge the credentials apply to
    pub forge_type: ForgeKind,
    /// Whether a token was found
    pub present: bool,
    /// The token, when present
    pub token: Option<String>,
}

/// Result of a release-asset lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReleaseAsset {
    /// The forge API cannot fulfill this lookup
    Unsupported,
}

/// Per-forge wiring data the host keeps alongside a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoTypeData {
    /// Forge identity
    pub git: ForgeKind,
    /// API root, e.g. `https://git.example.com/api/v1`
    pub base_uri: String,
    /// Root for browser-facing downloads
    pub base_download: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_updated_at_parses_rfc3339() {
        let meta = MetaRecord {
            last_updated: "2024-03-01T12:30:00+02:00".to_string(),
            ..MetaRecord::default()
        };
        assert_eq!(
            meta.last_updated_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_last_updated_at_invalid() {
        let meta = MetaRecord {
            last_updated: "yesterday".to_string(),
            ..MetaRecord::default()
        };
        assert!(meta.last_updated_at().is_none());
    }

    #[test]
    fn test_release_asset_serialization() {
        let json = serde_json::to_string(&ReleaseAsset::Unsupported).unwrap();
        assert_eq!(json, r#"{"status":"unsupported"}"#);
    }

    #[test]
    fn test_content_listing_default_is_empty() {
        let listing = ContentListing::default();
        assert!(listing.files.is_empty());
        assert!(listing.dirs.is_empty());
    }
}
