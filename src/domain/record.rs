use chrono::{DateTime, Utc};

use crate::domain::commit::{Commit, RepositoryRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub commit_id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub repository: String,
    pub branch: String,
}

impl SyncRecord {
    pub fn from_commit(commit: &Commit, title: String, repository: &RepositoryRef) -> Self {
        Self {
            commit_id: commit.sha.clone(),
            title,
            date: commit.authored_at,
            repository: repository.name.clone(),
            branch: commit.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordHandle(pub String);

impl RecordHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub handle: RecordHandle,
    pub commit_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<StoredRecord>,
    pub next_cursor: Option<String>,
}
