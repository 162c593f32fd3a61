//! Update-check cycle
//!
//! This module provides:
//! - The DescriptorRegistry capability the host keeps descriptors in
//! - An in-memory registry
//! - The cycle: read descriptor → fetch tags, meta, branches → derive
//!   download links → write derived fields back

mod version_info;

pub use version_info::{compare_tags, compare_versions, newest_tag};

use crate::domain::{BranchMap, MetaRecord, Normalized, RepositoryDescriptor, RollbackMap};
use crate::error::{AppError, CheckError};
use crate::forge::ForgeAdapters;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Values the host stores back after an update check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedFields {
    /// Newest release tag, when the repository has any
    pub newest_tag: Option<String>,
    /// Whether releases are published as tags
    pub uses_tags: bool,
    /// Archive link the host installs from
    pub download_link: String,
    /// Tag → archive link, for rollbacks
    pub rollback: RollbackMap,
    /// Branches with their download links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<BranchMap>,
    /// Repository metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaRecord>,
}

/// Host storage for tracked repositories
pub trait DescriptorRegistry: Send + Sync {
    /// Descriptor for a slug
    fn descriptor(&self, slug: &str) -> Option<RepositoryDescriptor>;

    /// Store fields derived by an update check
    fn store_derived(&self, slug: &str, derived: DerivedFields);
}

/// Descriptor registry that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryDescriptorRegistry {
    entries: Mutex<BTreeMap<String, (RepositoryDescriptor, Option<DerivedFields>)>>,
}

impl MemoryDescriptorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a repository under its slug
    pub fn insert(&self, repo: RepositoryDescriptor) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(repo.slug.clone(), (repo, None));
    }

    /// Fields stored by the last update check
    pub fn derived(&self, slug: &str) -> Option<DerivedFields> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(slug)
            .and_then(|(_, derived)| derived.clone())
    }
}

impl DescriptorRegistry for MemoryDescriptorRegistry {
    fn descriptor(&self, slug: &str) -> Option<RepositoryDescriptor> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(slug)
            .map(|(repo, _)| repo.clone())
    }

    fn store_derived(&self, slug: &str, derived: DerivedFields) {
        if let Some((_, slot)) = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get_mut(slug)
        {
            *slot = Some(derived);
        }
    }
}

/// Outcome of one update check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Repository checked
    pub slug: String,
    /// Fields written back to the registry
    pub derived: DerivedFields,
    /// Messages of forge errors passed through during the check
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CheckReport {
    /// Whether every request succeeded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs update checks for tracked repositories
pub struct UpdateCheck<'a> {
    adapters: &'a ForgeAdapters,
    registry: &'a dyn DescriptorRegistry,
}

impl<'a> UpdateCheck<'a> {
    /// Create an update check over a set of adapters and a registry
    pub fn new(adapters: &'a ForgeAdapters, registry: &'a dyn DescriptorRegistry) -> Self {
        Self { adapters, registry }
    }

    /// Check one repository and store what was derived.
    ///
    /// Forge errors are collected in the report; only a missing
    /// descriptor, a missing adapter or unresolvable endpoints fail.
    pub async fn run(&self, slug: &str) -> Result<CheckReport, AppError> {
        let mut repo = self
            .registry
            .descriptor(slug)
            .ok_or_else(|| CheckError::NotTracked {
                slug: slug.to_string(),
            })?;
        let adapter = self.adapters.for_descriptor(&repo)?;
        let mut errors = Vec::new();

        let tags = match adapter.remote_tag(&repo).await? {
            Normalized::Canonical(tags) => tags,
            Normalized::Passthrough(raw) => {
                errors.push(passthrough_message("tags", &raw));
                Vec::new()
            }
        };
        if let Some(newest) = newest_tag(&tags) {
            debug!(slug, newest, count = tags.len(), "found release tags");
            repo.newest_tag = Some(newest.to_string());
            repo.uses_tags = true;
        }

        let meta = match adapter.repo_meta(&repo).await? {
            Normalized::Canonical(meta) => Some(meta),
            Normalized::Passthrough(raw) => {
                errors.push(passthrough_message("meta", &raw));
                None
            }
        };

        let branches = match adapter.remote_branches(&repo).await? {
            Normalized::Canonical(branches) => Some(branches),
            Normalized::Passthrough(raw) => {
                errors.push(passthrough_message("branches", &raw));
                None
            }
        };

        let derived = DerivedFields {
            download_link: adapter.construct_download_link(&repo, None)?,
            rollback: adapter.rollback_links(&repo, &tags)?,
            newest_tag: repo.newest_tag.clone(),
            uses_tags: repo.uses_tags,
            branches,
            meta,
        };
        self.registry.store_derived(slug, derived.clone());
        info!(slug, link = %derived.download_link, errors = errors.len(), "update check finished");

        Ok(CheckReport {
            slug: slug.to_string(),
            derived,
            errors,
        })
    }
}

fn passthrough_message(what: &str, raw: &crate::domain::RawResponse) -> String {
    format!(
        "{}: {}",
        what,
        raw.error_message()
            .unwrap_or_else(|| "unrecognized error response".to_string())
    )
}
