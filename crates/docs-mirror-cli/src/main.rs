mod commands;
mod config;
mod git;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docs_mirror::SyncOptions;
use docs_mirror_http::{HttpFetcher, RetryPolicy};

use crate::commands::changelog::ChangeSource;
use crate::config::AppConfig;
use crate::git::Git;

/// Exit status for a sync that found nothing to change, when requested.
const EXIT_NO_CHANGES: u8 = 2;

#[derive(Parser)]
#[command(name = "docs-mirror")]
#[command(about = "Mirror a remote markdown documentation set and record its changes")]
struct Cli {
    /// Config file (defaults to ~/.config/docs-mirror/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync the local docs directory with the remote manifest
    Sync {
        /// Directory holding the mirrored pages
        #[arg(long)]
        docs_dir: Option<PathBuf>,
        /// Manifest URL
        #[arg(long)]
        manifest_url: Option<String>,
        /// Maximum pages fetched at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Fail when two manifest URLs map to the same filename
        #[arg(long)]
        strict: bool,
        /// Write the run summary as JSON to this path
        #[arg(long)]
        summary_out: Option<PathBuf>,
        /// Exit with status 2 when nothing changed
        #[arg(long)]
        changes_exit_code: bool,
    },
    /// Commit pending doc changes, grouped by change type
    Commit {
        /// Print the planned commits without creating them
        #[arg(long)]
        dry_run: bool,
    },
    /// Bump the date-based version and prepend a changelog entry
    Changelog {
        /// Read changes from a `sync --summary-out` file instead of git
        #[arg(long)]
        from_summary: Option<PathBuf>,
    },
}

fn load(cli_config: Option<&PathBuf>) -> Result<AppConfig> {
    match cli_config {
        Some(path) => config::load_from(path),
        None => Ok(config::load_config()),
    }
}

fn build_fetcher(config: &AppConfig) -> HttpFetcher {
    HttpFetcher::new(RetryPolicy {
        retries: config.retries,
        timeout: Duration::from_secs(config.timeout_secs),
        ..RetryPolicy::default()
    })
}

/// Repository-relative docs path with forward slashes, for git pathspecs.
fn git_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Status for a completed sync. Fatal errors exit 1 through `main`'s `Err`.
fn sync_exit_status(has_changes: bool, changes_exit_code: bool) -> u8 {
    if changes_exit_code && !has_changes {
        EXIT_NO_CHANGES
    } else {
        0
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let config = load(cli.config.as_ref())?;

    match cli.command {
        Command::Sync {
            docs_dir,
            manifest_url,
            concurrency,
            strict,
            summary_out,
            changes_exit_code,
        } => {
            let docs_dir = docs_dir.unwrap_or_else(|| config.docs_dir.clone());
            let options = SyncOptions {
                manifest_url: manifest_url.unwrap_or_else(|| config.manifest_url.clone()),
                url_pattern: config.url_pattern.clone(),
                concurrency: concurrency.unwrap_or(config.concurrency),
                strict_collisions: strict || config.strict_collisions,
            };
            let fetcher = build_fetcher(&config);

            let summary =
                commands::sync::run(&fetcher, &docs_dir, &options, summary_out.as_deref()).await?;

            Ok(ExitCode::from(sync_exit_status(
                summary.has_changes,
                changes_exit_code,
            )))
        }
        Command::Commit { dry_run } => {
            let git = Git::new(".");
            commands::commit::run(&git, &git_path(&config.docs_dir), dry_run)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Changelog { from_summary } => {
            let git = Git::new(".");
            let docs_dir = git_path(&config.docs_dir);
            let source = match &from_summary {
                Some(path) => ChangeSource::Summary(path),
                None => ChangeSource::Git {
                    git: &git,
                    docs_dir: &docs_dir,
                },
            };
            let today = chrono::Local::now().date_naive();
            commands::changelog::run(source, &config.changelog_file, &config.version_file, today)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
