//! CLI argument parsing module for gitea-updater

use crate::domain::RepositoryDescriptor;
use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Changelog fetched by `changes` when no file is given
pub const DEFAULT_CHANGELOG: &str = "CHANGES.md";

/// Directory fetched by `assets` when no path is given
pub const DEFAULT_ASSETS_PATH: &str = ".wordpress-org";

/// Query a Gitea repository the way the update host does
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gitea-updater",
    version,
    about = "Query Gitea repositories for plugin and theme updates"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    // Repository
    /// Root URL of the Gitea instance (e.g. https://git.example.com)
    #[arg(long)]
    pub base_uri: Option<String>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch checked out for updates
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// The repository's default branch
    #[arg(long, default_value = "main")]
    pub primary_branch: String,

    /// Newest release tag; marks the repository as tag-based
    #[arg(long)]
    pub tag: Option<String>,

    // Credentials and configuration
    /// Access token for this invocation
    #[arg(long, conflicts_with = "options")]
    pub token: Option<String>,

    /// Option file holding access tokens (TOML)
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Adapter configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Adapter operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a file from the checked-out branch (plugin headers)
    Info {
        /// File path inside the repository
        file: String,
    },
    /// List release tags
    Tags,
    /// Print the changelog
    Changes {
        /// Changelog file name
        #[arg(default_value = DEFAULT_CHANGELOG)]
        file: String,
    },
    /// Print readme.txt
    Readme,
    /// Show repository metadata
    Meta,
    /// List branches with their download links
    Branches,
    /// List assets (banners, icons) in a directory
    Assets {
        /// Directory inside the repository
        #[arg(default_value = DEFAULT_ASSETS_PATH)]
        path: String,
    },
    /// List files and directories at the repository root
    Contents,
    /// Look up the release asset download URL
    ReleaseAsset,
    /// Print the archive download link
    DownloadLink {
        /// Download this tag or branch instead of the current one
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,
    },
    /// Resolve the download link for a repository that is not tracked yet
    Install {
        /// Repository as owner/name
        #[arg(long = "repo", value_name = "OWNER/NAME")]
        remote: String,

        /// Branch to install (default: master)
        #[arg(long)]
        branch: Option<String>,

        /// One-time access token stored for the installed repository
        #[arg(long)]
        install_token: Option<String>,
    },
    /// Run a full update check and show what the host would store
    Check,
}

impl Command {
    /// Whether the command talks to the forge
    pub fn needs_network(&self) -> bool {
        !matches!(
            self,
            Command::ReleaseAsset | Command::DownloadLink { .. } | Command::Install { .. }
        )
    }

    /// Spinner text while the command runs
    pub fn progress_message(&self) -> &'static str {
        match self {
            Command::Info { .. } => "Fetching file...",
            Command::Tags => "Fetching tags...",
            Command::Changes { .. } => "Fetching changelog...",
            Command::Readme => "Fetching readme...",
            Command::Meta => "Fetching repository metadata...",
            Command::Branches => "Fetching branches...",
            Command::Assets { .. } => "Fetching assets...",
            Command::Contents => "Fetching contents...",
            Command::Check => "Checking for updates...",
            Command::ReleaseAsset | Command::DownloadLink { .. } | Command::Install { .. } => "",
        }
    }
}

impl CliArgs {
    /// Base URI, required by every command
    pub fn base_uri(&self) -> Result<&str, ConfigError> {
        self.base_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(ConfigError::MissingArgument { name: "--base-uri" })
    }

    /// Build the descriptor of the repository named on the command line
    pub fn descriptor(&self) -> Result<RepositoryDescriptor, ConfigError> {
        let owner = self
            .owner
            .as_deref()
            .ok_or(ConfigError::MissingArgument { name: "--owner" })?;
        let repo = self
            .repo
            .as_deref()
            .ok_or(ConfigError::MissingArgument { name: "--repo" })?;

        let descriptor = RepositoryDescriptor::new(self.base_uri()?, owner, repo)
            .with_branch(&self.branch)
            .with_primary_branch(&self.primary_branch);
        Ok(match &self.tag {
            Some(tag) => descriptor.with_newest_tag(tag),
            None => descriptor,
        })
    }

    /// Whether the spinner should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json && self.command.needs_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const REPO_ARGS: [&str; 7] = [
        "gitea-updater",
        "--base-uri",
        "https://git.example.com",
        "--owner",
        "acme",
        "--repo",
        "widget",
    ];

    fn parse(extra: &[&str]) -> CliArgs {
        CliArgs::parse_from(REPO_ARGS.iter().chain(extra.iter()).copied())
    }

    #[test]
    fn test_default_args() {
        let args = parse(&["tags"]);
        assert_eq!(args.command, Command::Tags);
        assert_eq!(args.branch, "main");
        assert_eq!(args.primary_branch, "main");
        assert!(args.tag.is_none());
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliArgs::try_parse_from(REPO_ARGS).is_err());
    }

    #[test]
    fn test_descriptor_from_args() {
        let args = parse(&["--branch", "develop", "--tag", "v1.2.0", "download-link"]);
        let repo = args.descriptor().unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.slug, "widget");
        assert_eq!(repo.branch, "develop");
        assert_eq!(repo.newest_tag.as_deref(), Some("v1.2.0"));
        assert!(repo.uses_tags);
    }

    #[test]
    fn test_descriptor_missing_owner() {
        let args = CliArgs::parse_from([
            "gitea-updater",
            "--base-uri",
            "https://git.example.com",
            "--repo",
            "widget",
            "meta",
        ]);
        assert!(matches!(
            args.descriptor(),
            Err(ConfigError::MissingArgument { name: "--owner" })
        ));
    }

    #[test]
    fn test_blank_base_uri_is_missing() {
        let args = CliArgs::parse_from(["gitea-updater", "--base-uri", " ", "tags"]);
        assert!(matches!(
            args.base_uri(),
            Err(ConfigError::MissingArgument { name: "--base-uri" })
        ));
    }

    #[test]
    fn test_subcommand_defaults() {
        assert_eq!(
            parse(&["changes"]).command,
            Command::Changes {
                file: DEFAULT_CHANGELOG.to_string()
            }
        );
        assert_eq!(
            parse(&["assets"]).command,
            Command::Assets {
                path: DEFAULT_ASSETS_PATH.to_string()
            }
        );
    }

    #[test]
    fn test_download_link_ref() {
        let args = parse(&["download-link", "--ref", "v1.0.0"]);
        assert_eq!(
            args.command,
            Command::DownloadLink {
                reference: Some("v1.0.0".to_string())
            }
        );
    }

    #[test]
    fn test_install_args() {
        let args = CliArgs::parse_from([
            "gitea-updater",
            "--base-uri",
            "https://git.example.com",
            "install",
            "--repo",
            "acme/widget",
            "--install-token",
            "secret",
        ]);
        assert_eq!(
            args.command,
            Command::Install {
                remote: "acme/widget".to_string(),
                branch: None,
                install_token: Some("secret".to_string()),
            }
        );
        assert!(args.repo.is_none());
    }

    #[test]
    fn test_token_conflicts_with_options_file() {
        let mut argv: Vec<&str> = REPO_ARGS.to_vec();
        argv.extend(["--token", "x", "--options", "opts.toml", "tags"]);
        assert!(CliArgs::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_show_progress() {
        assert!(parse(&["tags"]).show_progress());
        assert!(!parse(&["--json", "tags"]).show_progress());
        assert!(!parse(&["-q", "tags"]).show_progress());
        assert!(!parse(&["download-link"]).show_progress());
    }
}
