//! Repository descriptor owned by the update host

use crate::domain::ForgeKind;
use serde::{Deserialize, Serialize};

/// One tracked repository and its current branch/tag state.
///
/// The host owns descriptors; adapters read them and only hand back
/// derived values (download links, branch maps) for the host to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Forge the repository lives on
    pub forge: ForgeKind,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name, also the key for per-repository tokens
    pub slug: String,
    /// Root URL of the forge, e.g. `https://git.example.com`
    pub forge_base_uri: String,
    /// Branch currently checked out for updates
    pub branch: String,
    /// The repository's designated default branch
    pub primary_branch: String,
    /// Newest known tag, when the repository has tags
    #[serde(default)]
    pub newest_tag: Option<String>,
    /// Whether releases are published as tags
    #[serde(default)]
    pub uses_tags: bool,
}

impl RepositoryDescriptor {
    /// Create a Gitea descriptor on `main` with no tag information
    pub fn new(
        forge_base_uri: impl Into<String>,
        owner: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            forge: ForgeKind::Gitea,
            owner: owner.into(),
            slug: slug.into(),
            forge_base_uri: forge_base_uri.into(),
            branch: "main".to_string(),
            primary_branch: "main".to_string(),
            newest_tag: None,
            uses_tags: false,
        }
    }

    /// Set the checked-out branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the primary branch
    pub fn with_primary_branch(mut self, branch: impl Into<String>) -> Self {
        self.primary_branch = branch.into();
        self
    }

    /// Record the newest tag and mark the repository as tag-based
    pub fn with_newest_tag(mut self, tag: impl Into<String>) -> Self {
        self.newest_tag = Some(tag.into());
        self.uses_tags = true;
        self
    }

    /// Set the forge
    pub fn with_forge(mut self, forge: ForgeKind) -> Self {
        self.forge = forge;
        self
    }

    /// Whether the checked-out branch is the primary branch
    pub fn on_primary_branch(&self) -> bool {
        self.branch == self.primary_branch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let repo = RepositoryDescriptor::new("https://git.example.com", "acme", "widget");
        assert_eq!(repo.forge, ForgeKind::Gitea);
        assert_eq!(repo.branch, "main");
        assert_eq!(repo.primary_branch, "main");
        assert!(repo.newest_tag.is_none());
        assert!(!repo.uses_tags);
        assert!(repo.on_primary_branch());
    }

    #[test]
    fn test_with_newest_tag_marks_tags_used() {
        let repo = RepositoryDescriptor::new("https://git.example.com", "acme", "widget")
            .with_newest_tag("v1.2.0");
        assert_eq!(repo.newest_tag.as_deref(), Some("v1.2.0"));
        assert!(repo.uses_tags);
    }

    #[test]
    fn test_off_primary_branch() {
        let repo = RepositoryDescriptor::new("https://git.example.com", "acme", "widget")
            .with_branch("develop");
        assert!(!repo.on_primary_branch());
    }

    #[test]
    fn test_deserialize_without_tag_fields() {
        let repo: RepositoryDescriptor = serde_json::from_str(
            r#"{
                "forge": "gitea",
                "owner": "acme",
                "slug": "widget",
                "forge_base_uri": "https://git.example.com",
                "branch": "main",
                "primary_branch": "main"
            }"#,
        )
        .unwrap();
        assert!(repo.newest_tag.is_none());
        assert!(!repo.uses_tags);
    }
}
