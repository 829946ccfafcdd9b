use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the configuration resolved from the environment (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;
    for line in render(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn render(cfg: &AppConfig) -> Vec<String> {
    let window = match (cfg.commit_window.since, cfg.commit_window.until) {
        (None, None) => "<unbounded>".to_string(),
        (since, until) => format!(
            "{} .. {}",
            since.map(|d| d.to_string()).unwrap_or_default(),
            until.map(|d| d.to_string()).unwrap_or_default()
        ),
    };
    let repositories = if cfg.repo_names.is_empty() {
        "<not set>".to_string()
    } else {
        cfg.repo_names.join(", ")
    };

    vec![
        format!("GitHub API: {}", cfg.github_api_url),
        format!("GitHub token: {}", mask_secret(&cfg.github_token)),
        format!("GitHub author: {}", display_value(&cfg.github_author)),
        format!("Organization: {}", display_value(&cfg.org_name)),
        format!("Repositories: {repositories}"),
        format!("Commit window: {window}"),
        format!("Notion API: {}", cfg.notion_api_url),
        format!("Notion token: {}", mask_secret(&cfg.notion_token)),
        format!("Notion database: {}", display_value(&cfg.notion_database_id)),
        format!("Mistral API: {}", cfg.mistral_api_url),
        format!("Mistral token: {}", mask_secret(&cfg.mistral_token)),
        format!("Mistral model: {}", cfg.mistral_model),
        format!(
            "Summaries: {}",
            if cfg.summaries_enabled() { "enabled" } else { "disabled" }
        ),
        format!(
            "Excluded diff extensions: {}",
            cfg.excluded_extensions.as_slice().join(", ")
        ),
        format!("HTTP timeout: {}s", cfg.http_timeout.as_secs()),
    ]
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
