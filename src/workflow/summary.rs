use std::sync::Arc;

use crate::error::AppResult;
use crate::services::LanguageModelService;

pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary available";

pub fn render_prompt(commit_message: &str, diff: &str) -> String {
    format!(
        "
Given the commit message and code changes below, provide a bullet-point summary highlighting:
- The purpose of the commit based on the commit message
- What functions or methods were added, deleted, or modified according to the code diff
- Any significant changes in logic or functionality
- Keep summaries concise and under 200 tokens

Commit Message:
{commit_message}

Code Changes:
{diff}
"
    )
}

#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn LanguageModelService>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModelService>) -> Self {
        Self { model }
    }

    /// Expects an already filtered diff.
    pub async fn summarize(&self, commit_message: &str, diff: &str) -> AppResult<String> {
        let prompt = render_prompt(commit_message, diff);
        let summary = self.model.complete(&prompt).await?;
        Ok(summary.unwrap_or_else(|| NO_SUMMARY_PLACEHOLDER.to_string()))
    }
}
