use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::commit::{Commit, CommitWindow, RepositoryRef};
use crate::domain::record::{RecordHandle, RecordPage, StoredRecord, SyncRecord};
use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, RecordStoreService, SourceControlService};

pub fn sample_commit(sha: &str, message: &str) -> Commit {
    let offset = sha.bytes().map(u32::from).sum::<u32>();
    Commit {
        sha: sha.to_string(),
        message: message.to_string(),
        authored_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::minutes(i64::from(offset)),
        branch: String::new(),
    }
}

pub fn context(
    source: Arc<FakeSource>,
    store: Arc<FakeStore>,
    model: Option<Arc<FakeModel>>,
) -> AppContext {
    let config = AppConfig::from_lookup(|_| None).unwrap();
    AppContext::new(
        config,
        source,
        store,
        model.map(|model| model as Arc<dyn LanguageModelService>),
    )
}

#[derive(Default)]
pub struct FakeSource {
    branches: Vec<String>,
    commits: HashMap<String, Vec<Commit>>,
    diffs: HashMap<String, String>,
    missing_diffs: HashSet<String>,
    unknown_repositories: HashSet<String>,
    diff_requests: Mutex<Vec<String>>,
    authors: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: &str, commits: Vec<Commit>) -> Self {
        self.branches.push(branch.to_string());
        self.commits.insert(branch.to_string(), commits);
        self
    }

    pub fn with_diff(mut self, sha: &str, diff: &str) -> Self {
        self.diffs.insert(sha.to_string(), diff.to_string());
        self
    }

    pub fn with_missing_diff(mut self, sha: &str) -> Self {
        self.missing_diffs.insert(sha.to_string());
        self
    }

    pub fn with_unknown_repository(mut self, name: &str) -> Self {
        self.unknown_repositories.insert(name.to_string());
        self
    }

    pub fn diff_requests_for(&self, sha: &str) -> usize {
        self.diff_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| *requested == sha)
            .count()
    }

    pub fn authors_requested(&self) -> Vec<Option<String>> {
        self.authors.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceControlService for FakeSource {
    async fn list_repositories(&self, _owner: &str) -> AppResult<Vec<String>> {
        Ok(vec!["api".to_string()])
    }

    async fn list_branches(&self, repo: &RepositoryRef) -> AppResult<Vec<String>> {
        if self.unknown_repositories.contains(&repo.name) {
            return Err(AppError::NotFound(format!("repository {repo}")));
        }
        Ok(self.branches.clone())
    }

    async fn list_commits(
        &self,
        _repo: &RepositoryRef,
        branch: &str,
        author: Option<&str>,
        _window: CommitWindow,
    ) -> AppResult<Vec<Commit>> {
        self.authors.lock().unwrap().push(author.map(str::to_string));
        Ok(self
            .commits
            .get(branch)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|commit| Commit {
                branch: branch.to_string(),
                ..commit
            })
            .collect())
    }

    async fn fetch_diff(&self, _repo: &RepositoryRef, sha: &str) -> AppResult<String> {
        self.diff_requests.lock().unwrap().push(sha.to_string());
        if self.missing_diffs.contains(sha) {
            return Err(AppError::NotFound(format!("commit {sha}")));
        }
        Ok(self
            .diffs
            .get(sha)
            .cloned()
            .unwrap_or_else(|| format!("diff --git a/{sha}.rs b/{sha}.rs\n+// {sha}\n")))
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<StoredRecord>>,
    created: Mutex<Vec<SyncRecord>>,
    deleted: Mutex<Vec<String>>,
    lookups: Mutex<Vec<String>>,
    pages_requested: Mutex<usize>,
    page_size: Option<usize>,
    failing_creates: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_listing: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, handle: &str, commit_id: Option<&str>) -> Self {
        self.records.lock().unwrap().push(StoredRecord {
            handle: RecordHandle(handle.to_string()),
            commit_id: commit_id.map(str::to_string),
        });
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn failing_create_for(mut self, commit_id: &str) -> Self {
        self.failing_creates.insert(commit_id.to_string());
        self
    }

    pub fn failing_delete_for(mut self, handle: &str) -> Self {
        self.failing_deletes.insert(handle.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }

    pub fn created(&self) -> Vec<SyncRecord> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn lookups_for(&self, commit_id: &str) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .filter(|id| *id == commit_id)
            .count()
    }

    pub fn count_with_commit_id(&self, commit_id: &str) -> usize {
        self.handles_with_commit_id(commit_id).len()
    }

    pub fn handles_with_commit_id(&self, commit_id: &str) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.commit_id.as_deref() == Some(commit_id))
            .map(|record| record.handle.0.clone())
            .collect()
    }

    pub fn pages_requested(&self) -> usize {
        *self.pages_requested.lock().unwrap()
    }
}

#[async_trait]
impl RecordStoreService for FakeStore {
    async fn find_by_commit_id(&self, commit_id: &str) -> AppResult<Vec<RecordHandle>> {
        self.lookups.lock().unwrap().push(commit_id.to_string());
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.commit_id.as_deref() == Some(commit_id))
            .map(|record| record.handle.clone())
            .collect())
    }

    async fn create(&self, record: &SyncRecord) -> AppResult<()> {
        if self.failing_creates.contains(&record.commit_id) {
            return Err(AppError::RemoteService("Notion responded with 500".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let handle = RecordHandle(format!("page-{}", records.len() + 1));
        records.push(StoredRecord {
            handle,
            commit_id: Some(record.commit_id.clone()),
        });
        self.created.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn delete(&self, handle: &RecordHandle) -> AppResult<()> {
        if self.failing_deletes.contains(handle.as_str()) {
            return Err(AppError::RemoteService("Notion responded with 502".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .retain(|record| record.handle != *handle);
        self.deleted.lock().unwrap().push(handle.0.clone());
        Ok(())
    }

    async fn list_page(&self, cursor: Option<&str>) -> AppResult<RecordPage> {
        if self.failing_listing {
            return Err(AppError::RemoteService("Notion responded with 503".to_string()));
        }
        *self.pages_requested.lock().unwrap() += 1;
        let records = self.records.lock().unwrap();
        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let end = match self.page_size {
            Some(size) => (start + size).min(records.len()),
            None => records.len(),
        };
        Ok(RecordPage {
            records: records[start..end].to_vec(),
            next_cursor: (end < records.len()).then(|| end.to_string()),
        })
    }
}

pub struct FakeModel {
    reply: Result<Option<String>, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn with_reply(reply: Result<Option<String>, String>) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(summary: &str) -> Self {
        Self::with_reply(Ok(Some(summary.to_string())))
    }

    pub fn silent() -> Self {
        Self::with_reply(Ok(None))
    }

    pub fn failing() -> Self {
        Self::with_reply(Err("Mistral responded with 500".to_string()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for FakeModel {
    async fn complete(&self, prompt: &str) -> AppResult<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AppError::RemoteService)
    }
}

/// Local HTTP listener answering each request with the first route whose path
/// prefix matches, or 404.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Request lines in arrival order, e.g. `GET /path HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn stub_server(routes: Vec<(&'static str, u16, &'static str)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let read = socket.read(&mut chunk).await.unwrap_or(0);
                if read == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..read]);
                if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }

            let request = String::from_utf8_lossy(&buffer).to_string();
            let request_line = request.lines().next().unwrap_or("").to_string();
            let path = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
            seen.lock().unwrap().push(request_line);

            let (status, body) = routes
                .iter()
                .find(|(prefix, _, _)| path.starts_with(prefix))
                .map(|(_, status, body)| (*status, *body))
                .unwrap_or((404, "{}"));
            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    StubServer {
        base_url: format!("http://{addr}"),
        requests,
    }
}
