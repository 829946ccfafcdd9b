use std::collections::HashMap;

use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::record::{RecordHandle, StoredRecord};
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub commit_id: String,
    pub keep: RecordHandle,
    pub redundant: Vec<RecordHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub duplicate_groups: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Groups records by commit identifier in fetch order. The first record of a
/// group is the one kept.
pub fn find_duplicates(records: &[StoredRecord]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&RecordHandle>)> = Vec::new();

    for record in records {
        let Some(commit_id) = record.commit_id.as_deref() else {
            continue;
        };
        match index.get(commit_id) {
            Some(&position) => groups[position].1.push(&record.handle),
            None => {
                index.insert(commit_id, groups.len());
                groups.push((commit_id, vec![&record.handle]));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, handles)| handles.len() > 1)
        .map(|(commit_id, handles)| DuplicateGroup {
            commit_id: commit_id.to_string(),
            keep: handles[0].clone(),
            redundant: handles[1..].iter().map(|&handle| handle.clone()).collect(),
        })
        .collect()
}

pub async fn sweep_duplicates(ctx: &AppContext, dry_run: bool) -> AppResult<SweepReport> {
    let store = &ctx.record_store;
    let records = store.list_all().await?;
    let groups = find_duplicates(&records);

    let mut report = SweepReport {
        scanned: records.len(),
        duplicate_groups: groups.len(),
        ..SweepReport::default()
    };
    info!(
        scanned = report.scanned,
        duplicate_groups = report.duplicate_groups,
        "scanned record store"
    );

    for group in &groups {
        info!(
            commit = %group.commit_id,
            keep = group.keep.as_str(),
            redundant = group.redundant.len(),
            "duplicate commit"
        );
        if dry_run {
            continue;
        }
        for handle in &group.redundant {
            match store.delete(handle).await {
                Ok(()) => {
                    info!(record = handle.as_str(), commit = %group.commit_id, "deleted duplicate");
                    report.deleted += 1;
                }
                Err(err) => {
                    warn!(record = handle.as_str(), error = %err, "failed to delete duplicate");
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
