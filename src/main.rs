//! gitea-updater - query a Gitea repository the way an update host does
//!
//! Each subcommand runs one adapter operation against the repository
//! named by `--base-uri`, `--owner` and `--repo`.

use clap::Parser;
use gitea_updater::cli::{CliArgs, Command};
use gitea_updater::config::AdapterConfig;
use gitea_updater::domain::{ForgeKind, Normalized};
use gitea_updater::error::{AppError, ConfigError};
use gitea_updater::forge::{
    ForgeAdapters, GiteaAdapter, HostAdapter, HttpClient, InstallHeaders, InstallRequest,
};
use gitea_updater::options::{FileOptionStore, MemoryOptionStore, OptionStore};
use gitea_updater::output::{create_formatter, OutputConfig, Report};
use gitea_updater::progress::Progress;
use gitea_updater::update::{MemoryDescriptorRegistry, UpdateCheck};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code when the forge answered with an error
const EXIT_PASSTHROUGH: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose, args.quiet);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `--verbose` forces debug, otherwise RUST_LOG applies
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("gitea_updater=debug")
    } else {
        let default = if quiet { "error" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("gitea-updater v{}", env!("CARGO_PKG_VERSION"));
    }

    let config = match &args.config {
        Some(path) => AdapterConfig::load(path)?,
        None => AdapterConfig::default(),
    };
    let transport = Arc::new(HttpClient::from_config(&config)?);
    let adapter = Arc::new(GiteaAdapter::new(config, transport, option_store(&args)?)?);

    let mut progress = Progress::new(args.show_progress());
    progress.spinner(args.command.progress_message());
    let report = execute(&adapter, &args).await;
    progress.finish_and_clear();
    let report = report?;

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.is_passthrough() {
        Ok(ExitCode::from(EXIT_PASSTHROUGH))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Tokens come from `--options` or, for this invocation only, `--token`
fn option_store(args: &CliArgs) -> Result<Arc<dyn OptionStore>, ConfigError> {
    if let Some(path) = &args.options {
        return Ok(Arc::new(FileOptionStore::open(path)?));
    }

    let store = MemoryOptionStore::new();
    if let Some(token) = &args.token {
        store.set(ForgeKind::Gitea.token_option_key(), token)?;
    }
    Ok(Arc::new(store))
}

fn into_report<T>(normalized: Normalized<T>, canonical: impl FnOnce(T) -> Report) -> Report {
    match normalized {
        Normalized::Canonical(value) => canonical(value),
        Normalized::Passthrough(raw) => Report::Passthrough(raw),
    }
}

/// Build the install record from the remote install form fields
fn install_report(
    adapter: &GiteaAdapter,
    args: &CliArgs,
    remote: &str,
    branch: Option<&str>,
    install_token: Option<&str>,
) -> Result<Report, AppError> {
    let headers = InstallHeaders {
        base_uri: args.base_uri()?.to_string(),
    };
    let slug = remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(remote)
        .to_string();
    let request = InstallRequest {
        repo: slug,
        git_updater_repo: remote.to_string(),
        git_updater_branch: branch.unwrap_or_default().to_string(),
        gitea_access_token: install_token.map(str::to_string),
    };
    Ok(Report::Install(adapter.remote_install(&headers, request)?))
}

/// Run the selected adapter operation
///
/// Every command except `install` reads the repository descriptor from the
/// global flags.
async fn execute(adapter: &Arc<GiteaAdapter>, args: &CliArgs) -> Result<Report, AppError> {
    let descriptor = || args.descriptor();

    let report = match &args.command {
        Command::Install {
            remote,
            branch,
            install_token,
        } => install_report(
            adapter,
            args,
            remote,
            branch.as_deref(),
            install_token.as_deref(),
        )?,
        Command::Info { file } => {
            into_report(adapter.remote_info(&descriptor()?, file).await?, |content| {
                Report::File {
                    name: file.clone(),
                    content,
                }
            })
        }
        Command::Tags => into_report(adapter.remote_tag(&descriptor()?).await?, Report::Tags),
        Command::Changes { file } => {
            into_report(adapter.remote_changes(&descriptor()?, file).await?, |content| {
                Report::File {
                    name: file.clone(),
                    content,
                }
            })
        }
        Command::Readme => into_report(adapter.remote_readme(&descriptor()?).await?, |content| {
            Report::File {
                name: "readme.txt".to_string(),
                content,
            }
        }),
        Command::Meta => into_report(adapter.repo_meta(&descriptor()?).await?, Report::Meta),
        Command::Branches => {
            into_report(adapter.remote_branches(&descriptor()?).await?, Report::Branches)
        }
        Command::Assets { path } => {
            into_report(adapter.repo_assets(&descriptor()?, path).await?, Report::Assets)
        }
        Command::Contents => {
            into_report(adapter.repo_contents(&descriptor()?).await?, Report::Contents)
        }
        Command::ReleaseAsset => Report::ReleaseAsset(adapter.release_asset(&descriptor()?)),
        Command::DownloadLink { reference } => Report::DownloadLink(
            adapter.construct_download_link(&descriptor()?, reference.as_deref())?,
        ),
        Command::Check => {
            let repo = descriptor()?;
            let slug = repo.slug.clone();
            let registry = MemoryDescriptorRegistry::new();
            registry.insert(repo);
            let mut adapters = ForgeAdapters::new();
            adapters.register(adapter.clone());
            Report::Check(UpdateCheck::new(&adapters, &registry).run(&slug).await?)
        }
    };
    Ok(report)
}
