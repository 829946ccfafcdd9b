use clap::Args;
use tracing::info;

use crate::context::AppContext;
use crate::domain::commit::RepositoryRef;
use crate::error::{AppError, AppResult};
use crate::workflow::sync::{SyncOptions, SyncOutcome, sync_repositories};

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Sync every repository of the organization instead of REPO_NAME.
    #[arg(long)]
    pub all_repos: bool,
    /// Fall back to the raw commit title when summarization fails.
    #[arg(long)]
    pub summary_fallback: bool,
}

pub async fn run(ctx: &AppContext, args: SyncArgs) -> AppResult<SyncOutcome> {
    let repositories = resolve_repositories(ctx, args.all_repos).await?;
    if !ctx.config.commit_window.is_unbounded() {
        info!(window = ?ctx.config.commit_window, "restricting commits to date window");
    }

    let options = SyncOptions {
        summary_fallback: args.summary_fallback,
    };
    let outcome = sync_repositories(ctx, &repositories, options).await;

    if !outcome.aborted.is_empty() {
        let failed = outcome
            .aborted
            .iter()
            .map(|(repo, err)| format!("{repo} ({err})"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::RemoteService(format!(
            "{} of {} repositories failed to sync: {failed}; other repositories: {}",
            outcome.aborted.len(),
            repositories.len(),
            outcome.totals
        )));
    }

    Ok(outcome)
}

async fn resolve_repositories(ctx: &AppContext, all_repos: bool) -> AppResult<Vec<RepositoryRef>> {
    if !all_repos {
        return ctx.config.configured_repositories();
    }
    let owner = ctx.config.require_org()?;
    let names = ctx.source_control.list_repositories(owner).await?;
    info!(owner, count = names.len(), "listed organization repositories");
    Ok(names
        .into_iter()
        .map(|name| RepositoryRef::new(owner, name))
        .collect())
}
