//! Gitea REST endpoint templates
//!
//! Templates are fixed strings with `:owner`, `:repo`, `:branch`, `:file`,
//! `:path` and `:ref` placeholders, filled from a repository descriptor.

use crate::config::{AdapterConfig, DEFAULT_API_PATH, DEFAULT_BRANCHES_PER_PAGE};
use crate::domain::RepositoryDescriptor;
use crate::error::TemplateError;
use tracing::trace;
use url::Url;

const FILE_AT_REF: &str = "/repos/:owner/:repo/raw/:branch/:file";
const RELEASES: &str = "/repos/:owner/:repo/releases";
const REPO_META: &str = "/repos/:owner/:repo";
const BRANCHES: &str = "/repos/:owner/:repo/branches";
const CONTENTS_AT_PATH: &str = "/repos/:owner/:repo/contents/:path";
const CONTENTS_ROOT: &str = "/repos/:owner/:repo/contents/";
const ARCHIVE: &str = "/repos/:owner/:repo/archive/:ref.zip";

/// One operation of the forge REST surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Raw file contents at the descriptor's branch
    FileAtRef { file: &'a str },
    /// Release list, newest first
    Releases,
    /// Repository metadata
    RepoMeta,
    /// All branches, in a single page
    Branches,
    /// Directory listing at a path
    ContentsAtPath { path: &'a str },
    /// Directory listing at the repository root
    ContentsRoot,
    /// Zip archive of a branch or tag
    Archive { reference: &'a str },
}

impl<'a> Endpoint<'a> {
    /// Operation name, used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::FileAtRef { .. } => "file-at-ref",
            Endpoint::Releases => "releases-list",
            Endpoint::RepoMeta => "repo-meta",
            Endpoint::Branches => "branches-list",
            Endpoint::ContentsAtPath { .. } => "contents-at-path",
            Endpoint::ContentsRoot => "contents-root",
            Endpoint::Archive { .. } => "archive-download",
        }
    }

    /// Caller-supplied value for `:file`, `:path` or `:ref`
    fn argument(&self) -> Option<&'a str> {
        match *self {
            Endpoint::FileAtRef { file } => Some(file),
            Endpoint::ContentsAtPath { path } => Some(path),
            Endpoint::Archive { reference } => Some(reference),
            _ => None,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Endpoint::FileAtRef { .. } => FILE_AT_REF,
            Endpoint::Releases => RELEASES,
            Endpoint::RepoMeta => REPO_META,
            Endpoint::Branches => BRANCHES,
            Endpoint::ContentsAtPath { .. } => CONTENTS_AT_PATH,
            Endpoint::ContentsRoot => CONTENTS_ROOT,
            Endpoint::Archive { .. } => ARCHIVE,
        }
    }
}

/// A resolved request target relative to the API root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Path segments with every placeholder substituted, not yet encoded
    pub segments: Vec<String>,
    /// Query parameters in the order they are sent
    pub query: Vec<(String, String)>,
}

impl ResolvedEndpoint {
    /// Unencoded path relative to the API root, for logs
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Join onto an API root, percent-encoding each segment, and append the query string
    pub fn to_url(&self, api_root: &str) -> Result<String, TemplateError> {
        let mut url =
            Url::parse(api_root).map_err(|e| TemplateError::invalid_base_uri(api_root, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TemplateError::invalid_base_uri(api_root, "cannot be a base URL"))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url.into())
    }
}

/// Builds forge-specific request targets from descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    api_path: String,
    branches_per_page: u32,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self {
            api_path: DEFAULT_API_PATH.to_string(),
            branches_per_page: DEFAULT_BRANCHES_PER_PAGE,
        }
    }
}

impl EndpointResolver {
    /// Create a resolver from adapter configuration
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self {
            api_path: config.api_path.clone(),
            branches_per_page: config.branches_per_page,
        }
    }

    /// API root for a forge base URI, e.g. `https://git.example.com/api/v1`
    pub fn api_root(&self, forge_base_uri: &str) -> Result<String, TemplateError> {
        let base = forge_base_uri.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(TemplateError::missing_field("forge_base_uri", "api-root"));
        }
        Url::parse(base).map_err(|e| TemplateError::invalid_base_uri(base, e.to_string()))?;

        Ok(format!("{}/{}", base, self.api_path.trim_matches('/')))
    }

    /// Substitute placeholders and attach query parameters
    ///
    /// Owner and slug fill one segment each. Branch, ref, file and path
    /// values keep `/` as a separator; everything else, such as `#` or `?`
    /// in a branch name, is percent-encoded by `to_url`.
    pub fn resolve(
        &self,
        endpoint: Endpoint<'_>,
        repo: &RepositoryDescriptor,
    ) -> Result<ResolvedEndpoint, TemplateError> {
        let name = endpoint.name();
        let mut segments = Vec::new();

        for piece in endpoint.template().trim_start_matches('/').split('/') {
            let Some(placeholder) = piece.strip_prefix(':') else {
                segments.push(piece.to_string());
                continue;
            };
            let (field, suffix) = match placeholder.find('.') {
                Some(dot) => placeholder.split_at(dot),
                None => (placeholder, ""),
            };

            let (field, value) = match field {
                "owner" => ("owner", repo.owner.as_str()),
                "repo" => ("slug", repo.slug.as_str()),
                "branch" => ("branch", repo.branch.as_str()),
                other => (other, endpoint.argument().unwrap_or_default()),
            };
            if value.trim().is_empty() {
                return Err(TemplateError::missing_field(field, name));
            }

            if matches!(field, "owner" | "slug") {
                segments.push(value.to_string());
                continue;
            }

            // Gitea routes refs and file paths as wildcards, so `/` stays a separator
            let before = segments.len();
            segments.extend(value.split('/').filter(|s| !s.is_empty()).map(str::to_string));
            if segments.len() == before {
                return Err(TemplateError::missing_field(field, name));
            }
            if let Some(last) = segments.last_mut() {
                last.push_str(suffix);
            }
        }

        let query = match endpoint {
            Endpoint::Branches => vec![("per_page".to_string(), self.branches_per_page.to_string())],
            _ => Vec::new(),
        };

        Ok(ResolvedEndpoint { segments, query })
    }

    /// Full request URL for an endpoint
    pub fn url(
        &self,
        endpoint: Endpoint<'_>,
        repo: &RepositoryDescriptor,
    ) -> Result<String, TemplateError> {
        let root = self.api_root(&repo.forge_base_uri)?;
        let resolved = self.resolve(endpoint, repo)?;
        trace!(endpoint = endpoint.name(), path = %resolved.path(), "resolved endpoint");
        resolved.to_url(&root)
    }
}
