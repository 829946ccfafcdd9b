use std::collections::HashSet;
use std::fmt;
use std::ops::AddAssign;

use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::domain::commit::{Commit, RepositoryRef};
use crate::domain::diff::filter_diff;
use crate::domain::record::SyncRecord;
use crate::error::{AppError, AppResult};
use crate::workflow::summary::Summarizer;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Use the raw commit title when the summarizer fails instead of skipping
    /// the commit.
    pub summary_fallback: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub existing: usize,
    pub duplicates_in_run: usize,
    pub failed: usize,
}

impl AddAssign for SyncReport {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.existing += other.existing;
        self.duplicates_in_run += other.duplicates_in_run;
        self.failed += other.failed;
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} already present, {} repeated across branches, {} failed",
            self.created, self.existing, self.duplicates_in_run, self.failed
        )
    }
}

pub struct SyncOutcome {
    pub totals: SyncReport,
    pub distinct_commits: usize,
    pub aborted: Vec<(RepositoryRef, AppError)>,
}

/// Commit identifiers handled during the current invocation.
#[derive(Debug, Default)]
pub struct ProcessedSet(HashSet<String>);

impl ProcessedSet {
    /// Returns `false` when the identifier was already handled.
    pub fn mark(&mut self, commit_id: &str) -> bool {
        self.0.insert(commit_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

enum CommitOutcome {
    Created,
    Existing,
    AlreadyProcessed,
}

pub async fn sync_repositories(
    ctx: &AppContext,
    repositories: &[RepositoryRef],
    options: SyncOptions,
) -> SyncOutcome {
    let mut run = SyncRun::new(ctx, options);
    let mut outcome = SyncOutcome {
        totals: SyncReport::default(),
        distinct_commits: 0,
        aborted: Vec::new(),
    };

    for repo in repositories {
        match run.sync_repository(repo).await {
            Ok(report) => outcome.totals += report,
            Err(err) => {
                error!(repository = %repo, error = %err, "repository sync aborted");
                outcome.aborted.push((repo.clone(), err));
            }
        }
    }

    outcome.distinct_commits = run.processed().len();
    outcome
}

pub struct SyncRun<'a> {
    ctx: &'a AppContext,
    summarizer: Option<Summarizer>,
    options: SyncOptions,
    processed: ProcessedSet,
}

impl<'a> SyncRun<'a> {
    pub fn new(ctx: &'a AppContext, options: SyncOptions) -> Self {
        Self {
            ctx,
            summarizer: ctx.language_model.clone().map(Summarizer::new),
            options,
            processed: ProcessedSet::default(),
        }
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Enumeration failures abort the repository; per-commit failures are
    /// counted and skipped.
    pub async fn sync_repository(&mut self, repo: &RepositoryRef) -> AppResult<SyncReport> {
        let ctx = self.ctx;
        let source = &ctx.source_control;
        let mut report = SyncReport::default();

        info!(repository = %repo, "syncing repository");
        let branches = source.list_branches(repo).await?;
        debug!(repository = %repo, count = branches.len(), "listed branches");

        for branch in &branches {
            let commits = source
                .list_commits(
                    repo,
                    branch,
                    ctx.config.github_author.as_deref(),
                    ctx.config.commit_window,
                )
                .await?;
            info!(repository = %repo, %branch, count = commits.len(), "listed commits");

            for commit in &commits {
                match self.sync_commit(repo, commit).await {
                    Ok(CommitOutcome::Created) => {
                        info!(commit = commit.short_sha(), %branch, "record created");
                        report.created += 1;
                    }
                    Ok(CommitOutcome::Existing) => {
                        info!(
                            commit = commit.short_sha(),
                            %branch,
                            "already in store, skipping"
                        );
                        report.existing += 1;
                    }
                    Ok(CommitOutcome::AlreadyProcessed) => {
                        debug!(
                            commit = commit.short_sha(),
                            %branch,
                            "already handled in this run"
                        );
                        report.duplicates_in_run += 1;
                    }
                    Err(err) => {
                        warn!(commit = commit.short_sha(), %branch, error = %err, "commit skipped");
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    async fn sync_commit(
        &mut self,
        repo: &RepositoryRef,
        commit: &Commit,
    ) -> AppResult<CommitOutcome> {
        if !self.processed.mark(&commit.sha) {
            return Ok(CommitOutcome::AlreadyProcessed);
        }

        let ctx = self.ctx;
        let store = &ctx.record_store;
        if !store.find_by_commit_id(&commit.sha).await?.is_empty() {
            return Ok(CommitOutcome::Existing);
        }

        let diff = ctx.source_control.fetch_diff(repo, &commit.sha).await?;
        let diff = filter_diff(&diff, &ctx.config.excluded_extensions);

        let title = match &self.summarizer {
            Some(summarizer) => match summarizer.summarize(&commit.message, &diff).await {
                Ok(summary) => summary,
                Err(err) if self.options.summary_fallback => {
                    warn!(
                        commit = commit.short_sha(),
                        error = %err,
                        "summary failed, using commit title"
                    );
                    commit.title().to_string()
                }
                Err(err) => return Err(err),
            },
            None => commit.title().to_string(),
        };

        store
            .create(&SyncRecord::from_commit(commit, title, repo))
            .await?;
        Ok(CommitOutcome::Created)
    }
}
