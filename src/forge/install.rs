//! Remote install of a repository that is not tracked yet
//!
//! No descriptor exists at this point; the host only has the form fields
//! the user entered.

use crate::error::TemplateError;
use crate::forge::endpoint::ResolvedEndpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Branch installed when the user leaves the field empty
pub const DEFAULT_INSTALL_BRANCH: &str = "master";

/// Connection data for the forge being installed from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallHeaders {
    /// Root URL of the forge
    pub base_uri: String,
}

/// Form fields of a remote install
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstallRequest {
    /// Local slug, the key a provided token is stored under
    pub repo: String,
    /// Repository as `owner/name`
    pub git_updater_repo: String,
    /// Branch to install; empty means the default install branch
    #[serde(default)]
    pub git_updater_branch: String,
    /// One-time access token for private repositories
    #[serde(default)]
    pub gitea_access_token: Option<String>,
}

/// The install request with its download link resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRecord {
    /// Slug the host installs under
    pub repo: String,
    /// Branch the link targets
    pub branch: String,
    /// Archive to download
    pub download_link: String,
    /// Options to save with the installed repository (slug → token)
    pub options: BTreeMap<String, String>,
}

/// Resolve the download link for a remote install.
///
/// `api_path` is appended to the base URI the same way tracked
/// repositories resolve their API root.
pub fn resolve_install(
    headers: &InstallHeaders,
    request: InstallRequest,
    api_path: &str,
) -> Result<InstallRecord, TemplateError> {
    let base = headers.base_uri.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(TemplateError::missing_field("base_uri", "remote-install"));
    }
    let repo_path = request.git_updater_repo.trim().trim_matches('/');
    if repo_path.is_empty() {
        return Err(TemplateError::missing_field("git_updater_repo", "remote-install"));
    }

    let branch = match request.git_updater_branch.trim() {
        "" => DEFAULT_INSTALL_BRANCH.to_string(),
        branch => branch.to_string(),
    };
    let mut segments = vec!["repos".to_string()];
    segments.extend(repo_path.split('/').filter(|s| !s.is_empty()).map(str::to_string));
    segments.push("archive".to_string());
    segments.push(format!("{}.zip", branch));
    let api_root = format!("{}/{}", base, api_path.trim_matches('/'));
    let download_link = ResolvedEndpoint {
        segments,
        query: Vec::new(),
    }
    .to_url(&api_root)?;

    let mut options = BTreeMap::new();
    if let Some(token) = request.gitea_access_token.filter(|t| !t.is_empty()) {
        options.insert(request.repo.clone(), token);
    }

    Ok(InstallRecord {
        repo: request.repo,
        branch,
        download_link,
        options,
    })
}
