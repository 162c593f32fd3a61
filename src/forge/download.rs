//! Archive download links
//!
//! The ref a link targets is chosen in this order:
//! 1. an explicitly requested branch or tag
//! 2. the current branch, when it is not the primary branch or tags are unused
//! 3. the newest tag
//!
//! Registered [`LinkFilter`]s then see the finished link and may replace it
//! (rollbacks, pinned zip files) without the ref being chosen again.

use crate::domain::RepositoryDescriptor;
use crate::error::TemplateError;
use crate::forge::endpoint::{Endpoint, EndpointResolver};
use std::sync::Arc;
use tracing::debug;

/// Extension point that may rewrite a constructed download link
pub trait LinkFilter: Send + Sync {
    /// Return the link to use instead of `link`
    fn filter(&self, link: String, repo: &RepositoryDescriptor, explicit_ref: Option<&str>)
        -> String;
}

impl<F> LinkFilter for F
where
    F: Fn(String, &RepositoryDescriptor, Option<&str>) -> String + Send + Sync,
{
    fn filter(
        &self,
        link: String,
        repo: &RepositoryDescriptor,
        explicit_ref: Option<&str>,
    ) -> String {
        self(link, repo, explicit_ref)
    }
}

/// Builds archive download links for branches and tags
#[derive(Clone, Default)]
pub struct DownloadLinkBuilder {
    resolver: EndpointResolver,
    filters: Vec<Arc<dyn LinkFilter>>,
}

impl DownloadLinkBuilder {
    /// Create a builder without filters
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            resolver,
            filters: Vec::new(),
        }
    }

    /// Register a filter; filters run in registration order
    pub fn add_filter(&mut self, filter: Arc<dyn LinkFilter>) {
        self.filters.push(filter);
    }

    /// Choose the ref a download link should target
    pub fn select_ref<'a>(
        repo: &'a RepositoryDescriptor,
        explicit_ref: Option<&'a str>,
    ) -> Option<&'a str> {
        if let Some(reference) = explicit_ref.filter(|r| !r.is_empty()) {
            return Some(reference);
        }

        if !repo.on_primary_branch() || !repo.uses_tags {
            return Some(repo.branch.as_str()).filter(|b| !b.is_empty());
        }

        // A tag-based repository whose newest tag is not known yet still
        // downloads from its branch.
        repo.newest_tag
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| Some(repo.branch.as_str()).filter(|b| !b.is_empty()))
    }

    /// Link for an already chosen ref, before filters
    pub fn archive_link(
        &self,
        repo: &RepositoryDescriptor,
        reference: &str,
    ) -> Result<String, TemplateError> {
        self.resolver.url(Endpoint::Archive { reference }, repo)
    }

    /// Construct the download link for a repository
    pub fn build(
        &self,
        repo: &RepositoryDescriptor,
        explicit_ref: Option<&str>,
    ) -> Result<String, TemplateError> {
        let reference = Self::select_ref(repo, explicit_ref)
            .ok_or_else(|| TemplateError::missing_field("ref", "archive-download"))?;
        let link = self.archive_link(repo, reference)?;
        debug!(slug = %repo.slug, reference, "constructed download link");

        Ok(self.apply_filters(link, repo, explicit_ref))
    }

    /// Run every registered filter over a link
    pub fn apply_filters(
        &self,
        link: String,
        repo: &RepositoryDescriptor,
        explicit_ref: Option<&str>,
    ) -> String {
        self.filters
            .iter()
            .fold(link, |link, filter| filter.filter(link, repo, explicit_ref))
    }
}
