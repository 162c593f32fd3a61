//! Gitea adapter
//!
//! Implements the host adapter contract against the Gitea REST API.
//! API root: {forge base URI}/api/v1
//!
//! Gitea is always self-hosted, so every URL is derived from the
//! descriptor's base URI.

use crate::config::AdapterConfig;
use crate::domain::{
    AssetMap, BranchMap, ContentListing, Credentials, ForgeKind, Headers, MetaRecord, Normalized,
    RawResponse, ReleaseAsset, RepoTypeData, RepositoryDescriptor, RollbackMap, TagList,
};
use crate::error::{ConfigError, TemplateError};
use crate::forge::credentials::{with_auth_header, CredentialRequest, CredentialResolver};
use crate::forge::download::{DownloadLinkBuilder, LinkFilter};
use crate::forge::endpoint::{Endpoint, EndpointResolver};
use crate::forge::install::{resolve_install, InstallHeaders, InstallRecord, InstallRequest};
use crate::forge::normalize;
use crate::forge::{HostAdapter, HttpTransport};
use crate::options::OptionStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Readme the host parses for plugin metadata
const README_FILE: &str = "readme.txt";

/// Gitea adapter
pub struct GiteaAdapter {
    config: AdapterConfig,
    transport: Arc<dyn HttpTransport>,
    options: Arc<dyn OptionStore>,
    resolver: EndpointResolver,
    links: DownloadLinkBuilder,
    credentials: CredentialResolver,
}

impl GiteaAdapter {
    /// Create a new Gitea adapter.
    ///
    /// On first run this writes an empty global token to `options`.
    pub fn new(
        config: AdapterConfig,
        transport: Arc<dyn HttpTransport>,
        options: Arc<dyn OptionStore>,
    ) -> Result<Self, ConfigError> {
        let resolver = EndpointResolver::from_config(&config);
        let adapter = Self {
            links: DownloadLinkBuilder::new(resolver.clone()),
            resolver,
            config,
            transport,
            options,
            credentials: CredentialResolver::new(ForgeKind::Gitea),
        };
        adapter.ensure_default_credentials()?;
        Ok(adapter)
    }

    /// Register a download link filter
    pub fn with_link_filter(mut self, filter: Arc<dyn LinkFilter>) -> Self {
        self.links.add_filter(filter);
        self
    }

    /// Adapter configuration
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn ensure_default_credentials(&self) -> Result<(), ConfigError> {
        let key = ForgeKind::Gitea.token_option_key();
        if !self.options.contains(key) {
            self.options.set(key, "")?;
        }
        if self.config.token_required && self.options.get_non_empty(key).is_none() {
            warn!("no Gitea access token is set; private repositories will fail to update");
        }
        Ok(())
    }

    /// Credentials for requests about a repository
    pub fn credentials_for(&self, repo: &RepositoryDescriptor) -> Option<Credentials> {
        let request = CredentialRequest::for_descriptor(repo).with_caller(ForgeKind::Gitea);
        self.credentials.resolve(&request, self.options.as_ref())
    }

    async fn fetch(
        &self,
        endpoint: Endpoint<'_>,
        repo: &RepositoryDescriptor,
    ) -> Result<RawResponse, TemplateError> {
        let url = self.resolver.url(endpoint, repo)?;
        let headers = with_auth_header(
            Headers::new(),
            self.credentials_for(repo).as_ref(),
            ForgeKind::Gitea,
        );
        debug!(endpoint = endpoint.name(), %url, "requesting");

        let raw = self.transport.get(&url, &headers).await;
        if let Some(message) = raw.error_message() {
            debug!(endpoint = endpoint.name(), %message, "forge returned an error");
        }
        Ok(raw)
    }

    /// API and download roots the host stores for this repository
    pub fn repo_type_data(&self, repo: &RepositoryDescriptor) -> Result<RepoTypeData, TemplateError> {
        Ok(RepoTypeData {
            git: ForgeKind::Gitea,
            base_uri: self.resolver.api_root(&repo.forge_base_uri)?,
            base_download: repo.forge_base_uri.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HostAdapter for GiteaAdapter {
    fn forge(&self) -> ForgeKind {
        ForgeKind::Gitea
    }

    async fn remote_info(
        &self,
        repo: &RepositoryDescriptor,
        file: &str,
    ) -> Result<Normalized<String>, TemplateError> {
        let raw = self.fetch(Endpoint::FileAtRef { file }, repo).await?;
        Ok(normalize::normalize_file(raw))
    }

    async fn remote_tag(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<TagList>, TemplateError> {
        let raw = self.fetch(Endpoint::Releases, repo).await?;
        Ok(normalize::normalize_tags(raw))
    }

    async fn remote_changes(
        &self,
        repo: &RepositoryDescriptor,
        changelog: &str,
    ) -> Result<Normalized<String>, TemplateError> {
        let raw = self.fetch(Endpoint::FileAtRef { file: changelog }, repo).await?;
        Ok(normalize::normalize_file(raw))
    }

    async fn remote_readme(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<String>, TemplateError> {
        let raw = self.fetch(Endpoint::FileAtRef { file: README_FILE }, repo).await?;
        Ok(normalize::normalize_file(raw))
    }

    async fn repo_meta(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<MetaRecord>, TemplateError> {
        let raw = self.fetch(Endpoint::RepoMeta, repo).await?;
        Ok(normalize::normalize_meta(raw))
    }

    async fn remote_branches(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<BranchMap>, TemplateError> {
        let raw = self.fetch(Endpoint::Branches, repo).await?;

        // Names arrive non-empty and the request above already validated
        // owner, slug and base URI.
        Ok(normalize::normalize_branches(raw, |name| {
            self.links.build(repo, Some(name)).unwrap_or_else(|e| {
                warn!(branch = name, error = %e, "no download link for branch");
                String::new()
            })
        }))
    }

    async fn repo_assets(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
    ) -> Result<Normalized<AssetMap>, TemplateError> {
        let raw = self.fetch(Endpoint::ContentsAtPath { path }, repo).await?;
        Ok(normalize::normalize_assets(raw))
    }

    async fn repo_contents(
        &self,
        repo: &RepositoryDescriptor,
    ) -> Result<Normalized<ContentListing>, TemplateError> {
        let raw = self.fetch(Endpoint::ContentsRoot, repo).await?;
        Ok(normalize::normalize_contents(raw))
    }

    fn release_asset(&self, repo: &RepositoryDescriptor) -> ReleaseAsset {
        debug!(slug = %repo.slug, "Gitea has no release asset API");
        ReleaseAsset::Unsupported
    }

    fn construct_download_link(
        &self,
        repo: &RepositoryDescriptor,
        explicit_ref: Option<&str>,
    ) -> Result<String, TemplateError> {
        self.links.build(repo, explicit_ref)
    }

    fn rollback_links(
        &self,
        repo: &RepositoryDescriptor,
        tags: &[String],
    ) -> Result<RollbackMap, TemplateError> {
        let mut links = RollbackMap::new();
        for tag in tags {
            links.insert(tag.clone(), self.links.archive_link(repo, tag)?);
        }
        Ok(links)
    }

    fn remote_install(
        &self,
        headers: &InstallHeaders,
        request: InstallRequest,
    ) -> Result<InstallRecord, TemplateError> {
        resolve_install(headers, request, &self.config.api_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MemoryOptionStore;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned response and records what was requested
    struct CannedTransport {
        response: RawResponse,
        requests: Mutex<Vec<(String, Headers)>>,
    }

    impl CannedTransport {
        fn new(response: RawResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> (String, Headers) {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn get(&self, url: &str, headers: &Headers) -> RawResponse {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), headers.clone()));
            self.response.clone()
        }
    }

    fn repo() -> RepositoryDescriptor {
        RepositoryDescriptor::new("https://git.example.com", "acme", "widget")
    }

    fn adapter(transport: Arc<CannedTransport>, options: Arc<MemoryOptionStore>) -> GiteaAdapter {
        GiteaAdapter::new(AdapterConfig::default(), transport, options).unwrap()
    }

    #[test]
    fn test_first_run_writes_empty_token_once() {
        let options = Arc::new(MemoryOptionStore::new());
        let _ = adapter(CannedTransport::new(RawResponse::Text(String::new())), options.clone());
        assert_eq!(options.get("gitea_access_token").as_deref(), Some(""));

        options.set("gitea_access_token", "xxxx").unwrap();
        let _ = adapter(CannedTransport::new(RawResponse::Text(String::new())), options.clone());
        assert_eq!(options.get("gitea_access_token").as_deref(), Some("xxxx"));
    }

    #[tokio::test]
    async fn test_requests_carry_token_header() {
        let transport = CannedTransport::new(RawResponse::Text("[]".to_string()));
        let options = Arc::new(MemoryOptionStore::with_values([("gitea_access_token", "xxxx")]));
        let adapter = adapter(transport.clone(), options);

        adapter.remote_tag(&repo()).await.unwrap();
        let (url, headers) = transport.last_request();
        assert_eq!(url, "https://git.example.com/api/v1/repos/acme/widget/releases");
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("token xxxx"));
    }

    #[tokio::test]
    async fn test_requests_without_token_have_no_header() {
        let transport = CannedTransport::new(RawResponse::Text("[]".to_string()));
        let adapter = adapter(transport.clone(), Arc::new(MemoryOptionStore::new()));

        adapter.repo_contents(&repo()).await.unwrap();
        let (url, headers) = transport.last_request();
        assert_eq!(url, "https://git.example.com/api/v1/repos/acme/widget/contents/");
        assert!(headers.is_empty());
    }

    #[tokio::test]
    async fn test_branch_links_use_branch_names() {
        let transport = CannedTransport::new(RawResponse::Json(json!([
            {"name": "develop", "commit": {"id": "abc", "timestamp": "2024-01-01T00:00:00Z"}}
        ])));
        let adapter = adapter(transport.clone(), Arc::new(MemoryOptionStore::new()));
        let repo = repo().with_newest_tag("v1.2.0");

        let branches = adapter.remote_branches(&repo).await.unwrap().into_canonical().unwrap();
        assert_eq!(
            branches["develop"].download,
            "https://git.example.com/api/v1/repos/acme/widget/archive/develop.zip"
        );
        assert!(transport.last_request().0.ends_with("/branches?per_page=100"));
    }

    #[tokio::test]
    async fn test_branch_links_pass_through_filters() {
        let transport = CannedTransport::new(RawResponse::Json(json!([
            {"name": "develop", "commit": {"id": "abc", "timestamp": "2024-01-01T00:00:00Z"}},
            {"name": "main", "commit": {"id": "def", "timestamp": "2024-01-02T00:00:00Z"}}
        ])));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let adapter = adapter(transport, Arc::new(MemoryOptionStore::new())).with_link_filter(
            Arc::new(
                move |link: String, _: &RepositoryDescriptor, explicit: Option<&str>| {
                    recorder
                        .lock()
                        .unwrap()
                        .push(explicit.map(str::to_string));
                    format!("{}?mirror=1", link)
                },
            ),
        );
        let repo = repo().with_newest_tag("v1.2.0");

        let branches = adapter.remote_branches(&repo).await.unwrap().into_canonical().unwrap();
        assert_eq!(
            branches["develop"].download,
            "https://git.example.com/api/v1/repos/acme/widget/archive/develop.zip?mirror=1"
        );
        assert_eq!(
            branches["main"].download,
            "https://git.example.com/api/v1/repos/acme/widget/archive/main.zip?mirror=1"
        );

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![Some("develop".to_string()), Some("main".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_owner_fails_before_request() {
        let transport = CannedTransport::new(RawResponse::Json(json!([])));
        let adapter = adapter(transport.clone(), Arc::new(MemoryOptionStore::new()));
        let mut repo = repo();
        repo.owner.clear();

        assert!(adapter.remote_branches(&repo).await.is_err());
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_release_asset_unsupported() {
        let adapter = adapter(
            CannedTransport::new(RawResponse::Text(String::new())),
            Arc::new(MemoryOptionStore::new()),
        );
        assert_eq!(adapter.release_asset(&repo()), ReleaseAsset::Unsupported);
    }

    #[test]
    fn test_rollback_links_skip_filters() {
        let adapter = adapter(
            CannedTransport::new(RawResponse::Text(String::new())),
            Arc::new(MemoryOptionStore::new()),
        )
        .with_link_filter(Arc::new(
            |_: String, _: &RepositoryDescriptor, _: Option<&str>| "filtered".to_string(),
        ));

        let links = adapter
            .rollback_links(&repo(), &["v1.0.0".to_string(), "v1.1.0".to_string()])
            .unwrap();
        assert_eq!(
            links["v1.0.0"],
            "https://git.example.com/api/v1/repos/acme/widget/archive/v1.0.0.zip"
        );
        assert_eq!(adapter.construct_download_link(&repo(), None).unwrap(), "filtered");
    }

    #[test]
    fn test_repo_type_data() {
        let adapter = adapter(
            CannedTransport::new(RawResponse::Text(String::new())),
            Arc::new(MemoryOptionStore::new()),
        );
        let data = adapter
            .repo_type_data(&RepositoryDescriptor::new("https://git.example.com/", "a", "b"))
            .unwrap();
        assert_eq!(data.git, ForgeKind::Gitea);
        assert_eq!(data.base_uri, "https://git.example.com/api/v1");
        assert_eq!(data.base_download, "https://git.example.com");
    }
}
