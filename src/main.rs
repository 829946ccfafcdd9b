mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::sweep::{self, SweepArgs};
use crate::cmd::sync::{self, SyncArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::github::GitHubClient;
use crate::infra::http::build_client;
use crate::infra::mistral::MistralClient;
use crate::infra::notion::NotionClient;
use crate::services::LanguageModelService;

#[derive(Parser)]
#[command(
    name = "notion-sync",
    author,
    version,
    about = "Mirror GitHub commit history into a Notion database"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy new commits from every branch of the configured repositories into Notion.
    Sync(SyncArgs),
    /// Delete records that share a commit ID, keeping the first one found.
    Sweep(SweepArgs),
    /// Inspect the environment configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(verbose, quiet, rust_log.as_deref());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|err| {
        eprintln!("Ignoring invalid {}: {err}", EnvFilter::DEFAULT_ENV);
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// `-v` and `-q` take precedence over `RUST_LOG`, which in turn replaces the
/// default level.
fn filter_directives(verbose: bool, quiet: bool, rust_log: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    if quiet {
        return "warn".to_string();
    }
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => DEFAULT_LOG_LEVEL.to_string(),
    }
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Sync(args) => run_sync(args).await,
        Commands::Sweep(args) => run_sweep(args).await,
    }
}

async fn run_sync(args: SyncArgs) -> AppResult<()> {
    let config = AppConfig::load()?;

    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not configured; GitHub requests will fail.");
    }
    if config.github_author.is_none() {
        warn!("GITHUB_AUTHOR not configured; commits from every author will be synced.");
    }
    if !config.summaries_enabled() {
        warn!("MISTRAL_TOKEN not configured; records will use raw commit titles.");
    }

    let ctx = build_context(config)?;
    let outcome = sync::run(&ctx, args).await?;

    println!(
        "Sync finished: {} ({} distinct commits).",
        outcome.totals, outcome.distinct_commits
    );
    Ok(())
}

async fn run_sweep(args: SweepArgs) -> AppResult<()> {
    let config = AppConfig::load()?;
    let dry_run = args.dry_run;
    let ctx = build_context(config)?;
    let report = sweep::run(&ctx, args).await?;

    if dry_run {
        println!(
            "Dry run: {} records scanned, {} commits with duplicates.",
            report.scanned, report.duplicate_groups
        );
    } else {
        println!(
            "Sweep finished: {} records scanned, {} commits with duplicates, {} deleted, {} failed.",
            report.scanned, report.duplicate_groups, report.deleted, report.failed
        );
    }
    Ok(())
}

fn build_context(config: AppConfig) -> AppResult<AppContext> {
    if config.notion_token.is_none() {
        warn!("NOTION_TOKEN not configured; Notion requests will fail.");
    }
    let database_id = config.require_database_id()?.to_string();
    let http = build_client(config.http_timeout)?;

    let source_control = Arc::new(GitHubClient::new(
        http.clone(),
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));
    let record_store = Arc::new(NotionClient::new(
        http.clone(),
        config.notion_api_url.clone(),
        config.notion_token.clone(),
        database_id,
    ));
    let language_model = config.mistral_token.clone().map(|api_key| {
        Arc::new(MistralClient::new(
            http.clone(),
            config.mistral_api_url.clone(),
            Some(api_key),
            config.mistral_model.clone(),
        )) as Arc<dyn LanguageModelService>
    });

    Ok(AppContext::new(
        config,
        source_control,
        record_store,
        language_model,
    ))
}
