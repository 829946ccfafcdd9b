use async_trait::async_trait;

use crate::domain::record::{RecordHandle, RecordPage, StoredRecord, SyncRecord};
use crate::error::AppResult;

#[async_trait]
pub trait RecordStoreService: Send + Sync {
    async fn find_by_commit_id(&self, commit_id: &str) -> AppResult<Vec<RecordHandle>>;
    async fn create(&self, record: &SyncRecord) -> AppResult<()>;
    /// Deleting a record that is already gone succeeds.
    async fn delete(&self, handle: &RecordHandle) -> AppResult<()>;
    async fn list_page(&self, cursor: Option<&str>) -> AppResult<RecordPage>;

    async fn list_all(&self) -> AppResult<Vec<StoredRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.list_page(cursor.as_deref()).await?;
            records.extend(page.records);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}
