use std::env;
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::commit::{CommitWindow, RepositoryRef};
use crate::domain::diff::ExcludedExtensions;
use crate::error::{AppError, AppResult};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_MISTRAL_API_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MISTRAL_MODEL: &str = "open-mistral-7b";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub github_author: Option<String>,
    pub org_name: Option<String>,
    pub repo_names: Vec<String>,
    pub notion_token: Option<String>,
    pub notion_api_url: String,
    pub notion_database_id: Option<String>,
    pub mistral_token: Option<String>,
    pub mistral_api_url: String,
    pub mistral_model: String,
    pub commit_window: CommitWindow,
    pub excluded_extensions: ExcludedExtensions,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let repo_names = read("REPO_NAME")
            .map(|names| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let commit_window = CommitWindow {
            since: read("START_DATE")
                .map(|value| parse_date("START_DATE", &value))
                .transpose()?,
            until: read("END_DATE")
                .map(|value| parse_date("END_DATE", &value))
                .transpose()?,
        };
        if let (Some(since), Some(until)) = (commit_window.since, commit_window.until) {
            if since > until {
                return Err(AppError::Configuration(format!(
                    "START_DATE {since} is after END_DATE {until}"
                )));
            }
        }

        let http_timeout = match read("HTTP_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value.parse::<u64>().map_err(|_| {
                    AppError::Configuration(format!(
                        "HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{value}'"
                    ))
                })?;
                Duration::from_secs(secs.max(1))
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            github_token: read("GITHUB_TOKEN"),
            github_api_url: read("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            github_author: read("GITHUB_AUTHOR"),
            org_name: read("ORG_NAME"),
            repo_names,
            notion_token: read("NOTION_TOKEN"),
            notion_api_url: read("NOTION_API_URL")
                .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
            notion_database_id: read("NOTION_DATABASE_ID").or_else(|| read("DATABASE_ID")),
            mistral_token: read("MISTRAL_TOKEN"),
            mistral_api_url: read("MISTRAL_API_URL")
                .unwrap_or_else(|| DEFAULT_MISTRAL_API_URL.to_string()),
            mistral_model: read("MISTRAL_MODEL")
                .unwrap_or_else(|| DEFAULT_MISTRAL_MODEL.to_string()),
            commit_window,
            excluded_extensions: read("DIFF_EXCLUDE_EXTENSIONS")
                .map(|value| ExcludedExtensions::parse(&value))
                .unwrap_or_default(),
            http_timeout,
        })
    }

    pub fn summaries_enabled(&self) -> bool {
        self.mistral_token.is_some()
    }

    pub fn require_org(&self) -> AppResult<&str> {
        self.org_name
            .as_deref()
            .ok_or_else(|| AppError::Configuration("ORG_NAME not configured".to_string()))
    }

    pub fn require_database_id(&self) -> AppResult<&str> {
        self.notion_database_id.as_deref().ok_or_else(|| {
            AppError::Configuration("NOTION_DATABASE_ID not configured".to_string())
        })
    }

    pub fn configured_repositories(&self) -> AppResult<Vec<RepositoryRef>> {
        let owner = self.require_org()?;
        if self.repo_names.is_empty() {
            return Err(AppError::Configuration(
                "REPO_NAME not configured".to_string(),
            ));
        }
        Ok(self
            .repo_names
            .iter()
            .map(|name| RepositoryRef::new(owner, name.as_str()))
            .collect())
    }
}

fn parse_date(key: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| {
        AppError::Configuration(format!("{key} must be YYYY-MM-DD, got '{value}': {err}"))
    })
}
