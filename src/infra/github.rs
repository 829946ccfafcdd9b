use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    Client, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use tracing::debug;

use crate::domain::commit::{Commit, CommitWindow, RepositoryRef};
use crate::error::{AppError, AppResult};
use crate::infra::http::{ensure_success, read_json, transport_error};
use crate::services::SourceControlService;

const SERVICE: &str = "GitHub";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(http: Client, base_url: String, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| AppError::Auth("GitHub token not configured".to_string()))
    }

    fn get(&self, url: String, accept: &str) -> AppResult<RequestBuilder> {
        let token = self.token()?;
        debug!(%url, "GitHub request");
        Ok(self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, accept))
    }

    fn repo_endpoint(&self, repo: &RepositoryRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, repo.owner, repo.name, path
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> AppResult<T> {
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        read_json(SERVICE, response).await
    }
}

#[async_trait]
impl SourceControlService for GitHubClient {
    async fn list_repositories(&self, owner: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/orgs/{}/repos", self.base_url, owner);
        let repos: Vec<GitHubNamed> = match self.get_json(self.get(url, JSON_MEDIA_TYPE)?).await {
            Err(AppError::NotFound(_)) => {
                debug!(owner, "not an organization, listing user repositories");
                let url = format!("{}/users/{}/repos", self.base_url, owner);
                self.get_json(self.get(url, JSON_MEDIA_TYPE)?).await?
            }
            result => result?,
        };
        Ok(repos
            .into_iter()
            .map(|repo| repo.name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn list_branches(&self, repo: &RepositoryRef) -> AppResult<Vec<String>> {
        let url = self.repo_endpoint(repo, "branches");
        let branches: Vec<GitHubNamed> = self.get_json(self.get(url, JSON_MEDIA_TYPE)?).await?;
        Ok(branches.into_iter().map(|branch| branch.name).collect())
    }

    async fn list_commits(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        author: Option<&str>,
        window: CommitWindow,
    ) -> AppResult<Vec<Commit>> {
        let url = self.repo_endpoint(repo, "commits");
        let mut query = vec![("sha", branch.to_string())];
        if let Some(author) = author {
            query.push(("author", author.to_string()));
        }
        if let Some(since) = window.since_timestamp() {
            query.push(("since", since));
        }
        if let Some(until) = window.until_timestamp() {
            query.push(("until", until));
        }

        let request = self.get(url, JSON_MEDIA_TYPE)?.query(&query);
        let commits: Vec<GitHubCommit> = self.get_json(request).await?;
        Ok(commits
            .into_iter()
            .map(|commit| commit.into_commit(branch))
            .collect())
    }

    async fn fetch_diff(&self, repo: &RepositoryRef, sha: &str) -> AppResult<String> {
        let url = self.repo_endpoint(repo, &format!("commits/{sha}"));
        let response = self
            .get(url, DIFF_MEDIA_TYPE)?
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        response
            .text()
            .await
            .map_err(|err| transport_error(SERVICE, err))
    }
}

#[derive(Deserialize)]
struct GitHubNamed {
    name: String,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Deserialize)]
struct GitHubCommitDetail {
    message: String,
    author: GitHubSignature,
}

#[derive(Deserialize)]
struct GitHubSignature {
    date: DateTime<Utc>,
}

impl GitHubCommit {
    fn into_commit(self, branch: &str) -> Commit {
        Commit {
            sha: self.sha,
            message: self.commit.message,
            authored_at: self.commit.author.date,
            branch: branch.to_string(),
        }
    }
}
