use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::sweep::{SweepReport, sweep_duplicates};

#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// Report duplicate records without deleting them.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &AppContext, args: SweepArgs) -> AppResult<SweepReport> {
    sweep_duplicates(ctx, args.dry_run).await
}
