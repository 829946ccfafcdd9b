use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Sends one single-turn prompt. `None` means the model produced no choice.
    async fn complete(&self, prompt: &str) -> AppResult<Option<String>>;
}
