//! Forge type definitions for supported git hosts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Git hosting services an update host can track repositories on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForgeKind {
    /// github.com or GitHub Enterprise
    GitHub,
    /// gitlab.com or self-managed GitLab
    GitLab,
    /// Bitbucket Cloud or Server
    Bitbucket,
    /// Gitea (always self-hosted)
    Gitea,
}

impl ForgeKind {
    /// Returns the lowercase identifier used in descriptors and option keys
    pub fn id(&self) -> &'static str {
        match self {
            ForgeKind::GitHub => "github",
            ForgeKind::GitLab => "gitlab",
            ForgeKind::Bitbucket => "bitbucket",
            ForgeKind::Gitea => "gitea",
        }
    }

    /// Returns the display name for this forge
    pub fn display_name(&self) -> &'static str {
        match self {
            ForgeKind::GitHub => "GitHub",
            ForgeKind::GitLab => "GitLab",
            ForgeKind::Bitbucket => "Bitbucket",
            ForgeKind::Gitea => "Gitea",
        }
    }

    /// Returns the option key holding this forge's global access token
    pub fn token_option_key(&self) -> &'static str {
        match self {
            ForgeKind::GitHub => "github_access_token",
            ForgeKind::GitLab => "gitlab_access_token",
            ForgeKind::Bitbucket => "bitbucket_password",
            ForgeKind::Gitea => "gitea_access_token",
        }
    }

    /// Returns all supported forges
    pub fn all() -> &'static [ForgeKind] {
        &[
            ForgeKind::GitHub,
            ForgeKind::GitLab,
            ForgeKind::Bitbucket,
            ForgeKind::Gitea,
        ]
    }
}

impl fmt::Display for ForgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ForgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ForgeKind::all()
            .iter()
            .copied()
            .find(|forge| forge.id() == needle)
            .ok_or_else(|| format!("unknown forge '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(ForgeKind::GitHub.id(), "github");
        assert_eq!(ForgeKind::Gitea.id(), "gitea");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(format!("{}", ForgeKind::Gitea), "Gitea");
        assert_eq!(format!("{}", ForgeKind::GitLab), "GitLab");
    }

    #[test]
    fn test_token_option_key() {
        assert_eq!(ForgeKind::Gitea.token_option_key(), "gitea_access_token");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Gitea".parse::<ForgeKind>().unwrap(), ForgeKind::Gitea);
        assert_eq!(" github ".parse::<ForgeKind>().unwrap(), ForgeKind::GitHub);
        assert!("sourcehut".parse::<ForgeKind>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_uses_ids() {
        let json = serde_json::to_string(&ForgeKind::Gitea).unwrap();
        assert_eq!(json, "\"gitea\"");
        let forge: ForgeKind = serde_json::from_str("\"bitbucket\"").unwrap();
        assert_eq!(forge, ForgeKind::Bitbucket);
    }
}
