//! Forge adapters for the update host
//!
//! This module provides:
//! - The HostAdapter contract the host calls for every backend
//! - A registry dispatching descriptors to adapters by forge
//! - The HTTP collaborator capability and its reqwest implementation
//! - The Gitea adapter: endpoints, normalization, download links, credentials

mod client;
pub mod credentials;
pub mod download;
pub mod endpoint;
mod gitea;
pub mod install;
pub mod normalize;

pub use client::{HttpClient, HttpTransport};
pub use credentials::{CredentialRequest, CredentialResolver};
pub use download::{DownloadLinkBuilder, LinkFilter};
pub use endpoint::{Endpoint, EndpointResolver};
pub use gitea::GiteaAdapter;
pub use install::{InstallHeaders, InstallRecord, InstallRequest};

use crate::domain::{
    AssetMap, BranchMap, ContentListing, ForgeKind, MetaRecord, Normalized, ReleaseAsset,
    RepositoryDescriptor, RollbackMap, TagList,
};
use crate::error::{CheckError, TemplateError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Operations the host invokes on every forge backend.
///
/// Network operations return either a canonical record or the forge's
/// error response unchanged; only endpoint resolution fails hard.
#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// Forge this adapter talks to
    fn forge(&self) -> ForgeKind;

    /// Raw contents of a file at the current branch (plugin headers)
    async fn remote_info(
        &self,
        repo: &RepositoryDescriptor,
        file: &str,
    ) -> Result<Normalized<String>, TemplateError>;

    /// Tag names of published releases
    async fn remote_tag(&self, repo: &RepositoryDescriptor)
        -> Result<Normalized<TagList>, TemplateError>;

    /// Raw changelog file
    async fn remote_changes(
        &self,
        repo: &RepositoryDescriptor,
        changelog: &str,
    ) -> Result<Normalized<String>, TemplateError>;

    /// Raw readme.txt
    async fn remote_readme(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<String>, TemplateError>;

    /// Repository metadata
    async fn repo_meta(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<MetaRecord>, TemplateError>;

    /// All branches with their download links
    async fn remote_branches(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<BranchMap>, TemplateError>;

    /// Assets (banners, icons) in a repository directory
    async fn repo_assets(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
    ) -> Result<Normalized<AssetMap>, TemplateError>;

    /// Files and directories at the repository root
    async fn repo_contents(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<ContentListing>, TemplateError>;

    /// Release asset download URL
    fn release_asset(&self, repo: &RepositoryDescriptor) -> ReleaseAsset;

    /// Archive download link for the repository, or for an explicit ref
    fn construct_download_link(
        &self,
        repo: &RepositoryDescriptor,
        explicit_ref: Option<&str>,
    ) -> Result<String, TemplateError>;

    /// Archive links for each tag, for rolling back to an older release.
    ///
    /// Unlike [`construct_download_link`](Self::construct_download_link)
    /// these links do not pass through link filters.
    fn rollback_links(
        &self,
        repo: &RepositoryDescriptor,
        tags: &[String],
    ) -> Result<RollbackMap, TemplateError>;

    /// Resolve a remote install of a repository that is not tracked yet
    fn remote_install(
        &self,
        headers: &InstallHeaders,
        request: InstallRequest,
    ) -> Result<InstallRecord, TemplateError>;
}

/// Adapters keyed by the forge they serve
#[derive(Default, Clone)]
pub struct ForgeAdapters {
    adapters: HashMap<ForgeKind, Arc<dyn HostAdapter>>,
}

impl ForgeAdapters {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own forge, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn HostAdapter>) {
        self.adapters.insert(adapter.forge(), adapter);
    }

    /// Adapter for a forge
    pub fn get(&self, forge: ForgeKind) -> Option<Arc<dyn HostAdapter>> {
        self.adapters.get(&forge).cloned()
    }

    /// Adapter for the forge a descriptor lives on
    pub fn for_descriptor(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Arc<dyn HostAdapter>, CheckError> {
        self.get(repo.forge).ok_or_else(|| CheckError::NoAdapter {
            forge: repo.forge.id().to_string(),
        })
    }

    /// Forges with a registered adapter, sorted
    pub fn forges(&self) -> Vec<ForgeKind> {
        let mut forges: Vec<_> = self.adapters.keys().copied().collect();
        forges.sort();
        forges
    }
}
