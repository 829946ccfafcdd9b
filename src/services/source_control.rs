use async_trait::async_trait;

use crate::domain::commit::{Commit, CommitWindow, RepositoryRef};
use crate::error::AppResult;

#[async_trait]
pub trait SourceControlService: Send + Sync {
    async fn list_repositories(&self, owner: &str) -> AppResult<Vec<String>>;
    async fn list_branches(&self, repo: &RepositoryRef) -> AppResult<Vec<String>>;
    /// Only the first page the source returns is read.
    async fn list_commits(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        author: Option<&str>,
        window: CommitWindow,
    ) -> AppResult<Vec<Commit>>;
    async fn fetch_diff(&self, repo: &RepositoryRef, sha: &str) -> AppResult<String>;
}
