//! Access token resolution and the `Authorization` header

use crate::domain::{Credentials, ForgeKind, Headers, RepositoryDescriptor};
use crate::options::OptionStore;

/// Header the forge reads access tokens from
pub const AUTHORIZATION: &str = "Authorization";

/// What the host knows about a request that needs credentials.
///
/// Every field is optional: remote installs know the calling adapter but
/// not yet the forge, update checks know the forge from the descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialRequest<'a> {
    /// Forge named by the descriptor
    pub forge: Option<ForgeKind>,
    /// Repository slug, the key of per-repository tokens
    pub slug: Option<&'a str>,
    /// Adapter making the request
    pub caller: Option<ForgeKind>,
}

impl<'a> CredentialRequest<'a> {
    /// Request for a tracked repository
    pub fn for_descriptor(repo: &'a RepositoryDescriptor) -> Self {
        Self {
            forge: Some(repo.forge),
            slug: Some(repo.slug.as_str()).filter(|s| !s.is_empty()),
            caller: None,
        }
    }

    /// Request made by an adapter before the forge is known
    pub fn from_caller(caller: ForgeKind) -> Self {
        Self {
            caller: Some(caller),
            ..Self::default()
        }
    }

    /// Set the calling adapter
    pub fn with_caller(mut self, caller: ForgeKind) -> Self {
        self.caller = Some(caller);
        self
    }
}

/// Resolves tokens for one forge identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialResolver {
    forge: ForgeKind,
}

impl CredentialResolver {
    /// Create a resolver for a forge
    pub fn new(forge: ForgeKind) -> Self {
        Self { forge }
    }

    /// Resolve credentials for a request.
    ///
    /// Returns `None` when the request names neither this forge nor this
    /// adapter as caller; such requests belong to another backend. A
    /// per-repository token wins over the global one.
    pub fn resolve(
        &self,
        request: &CredentialRequest<'_>,
        options: &dyn OptionStore,
    ) -> Option<Credentials> {
        let targets_forge = request.forge == Some(self.forge);
        let called_by_adapter = request.caller == Some(self.forge);
        if !targets_forge && !called_by_adapter {
            return None;
        }

        let token = request
            .slug
            .and_then(|slug| options.get_non_empty(slug))
            .or_else(|| options.get_non_empty(self.forge.token_option_key()));

        Some(Credentials {
            forge_type: self.forge,
            present: token.is_some(),
            token,
        })
    }
}

/// Add the `Authorization: token …` header.
///
/// Leaves the headers untouched when there are no credentials, they are
/// for another forge, or they carry no token. Other headers are kept.
pub fn with_auth_header(
    mut headers: Headers,
    credentials: Option<&Credentials>,
    forge: ForgeKind,
) -> Headers {
    let token = credentials
        .filter(|c| c.forge_type == forge && c.present)
        .and_then(|c| c.token.as_deref());

    if let Some(token) = token {
        headers.insert(AUTHORIZATION.to_string(), format!("token {}", token));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MemoryOptionStore;

    fn repo() -> RepositoryDescriptor {
        RepositoryDescriptor::new("https://git.example.com", "acme", "widget")
    }

    #[test]
    fn test_global_token() {
        let options = MemoryOptionStore::with_values([("gitea_access_token", "xxxx")]);
        let repo = repo();
        let creds = CredentialResolver::new(ForgeKind::Gitea)
            .resolve(&CredentialRequest::for_descriptor(&repo), &options)
            .unwrap();
        assert_eq!(
            creds,
            Credentials {
                forge_type: ForgeKind::Gitea,
                present: true,
                token: Some("xxxx".to_string()),
            }
        );
    }

    #[test]
    fn test_per_repository_token_wins() {
        let options = MemoryOptionStore::with_values([
            ("gitea_access_token", "global"),
            ("widget", "specific"),
        ]);
        let repo = repo();
        let creds = CredentialResolver::new(ForgeKind::Gitea)
            .resolve(&CredentialRequest::for_descriptor(&repo), &options)
            .unwrap();
        assert_eq!(creds.token.as_deref(), Some("specific"));
    }

    #[test]
    fn test_empty_per_repository_token_falls_back() {
        let options =
            MemoryOptionStore::with_values([("gitea_access_token", "global"), ("widget", "")]);
        let repo = repo();
        let creds = CredentialResolver::new(ForgeKind::Gitea)
            .resolve(&CredentialRequest::for_descriptor(&repo), &options)
            .unwrap();
        assert_eq!(creds.token.as_deref(), Some("global"));
    }

    #[test]
    fn test_no_token() {
        let options = MemoryOptionStore::new();
        let repo = repo();
        let creds = CredentialResolver::new(ForgeKind::Gitea)
            .resolve(&CredentialRequest::for_descriptor(&repo), &options)
            .unwrap();
        assert!(!creds.present);
        assert!(creds.token.is_none());
        assert_eq!(creds.forge_type, ForgeKind::Gitea);
    }

    #[test]
    fn test_other_forge_is_not_resolved() {
        let options = MemoryOptionStore::with_values([("gitea_access_token", "xxxx")]);
        let repo = repo().with_forge(ForgeKind::GitHub);
        let resolver = CredentialResolver::new(ForgeKind::Gitea);
        assert!(resolver
            .resolve(&CredentialRequest::for_descriptor(&repo), &options)
            .is_none());
    }

    #[test]
    fn test_caller_identity_alone_is_enough() {
        let options = MemoryOptionStore::with_values([("gitea_access_token", "xxxx")]);
        let resolver = CredentialResolver::new(ForgeKind::Gitea);

        let creds = resolver
            .resolve(&CredentialRequest::from_caller(ForgeKind::Gitea), &options)
            .unwrap();
        assert_eq!(creds.token.as_deref(), Some("xxxx"));

        let repo = repo().with_forge(ForgeKind::GitHub);
        let request = CredentialRequest::for_descriptor(&repo).with_caller(ForgeKind::Gitea);
        assert!(resolver.resolve(&request, &options).is_some());
    }

    #[test]
    fn test_empty_request_is_not_resolved() {
        let options = MemoryOptionStore::with_values([("gitea_access_token", "xxxx")]);
        let resolver = CredentialResolver::new(ForgeKind::Gitea);
        assert!(resolver
            .resolve(&CredentialRequest::default(), &options)
            .is_none());
    }

    #[test]
    fn test_auth_header_added_without_clobbering() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        let creds = Credentials {
            forge_type: ForgeKind::Gitea,
            present: true,
            token: Some("xxxx".to_string()),
        };

        let headers = with_auth_header(headers, Some(&creds), ForgeKind::Gitea);
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("token xxxx"));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_auth_header_untouched_without_token() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        let absent = Credentials {
            forge_type: ForgeKind::Gitea,
            present: false,
            token: None,
        };

        let unchanged = with_auth_header(headers.clone(), None, ForgeKind::Gitea);
        assert_eq!(unchanged, headers);
        let unchanged = with_auth_header(headers.clone(), Some(&absent), ForgeKind::Gitea);
        assert_eq!(unchanged, headers);
    }

    #[test]
    fn test_auth_header_ignores_other_forge() {
        let creds = Credentials {
            forge_type: ForgeKind::GitHub,
            present: true,
            token: Some("ghp".to_string()),
        };
        let headers = with_auth_header(Headers::new(), Some(&creds), ForgeKind::Gitea);
        assert!(headers.is_empty());
    }
}
