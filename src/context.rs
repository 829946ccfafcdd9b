use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{LanguageModelService, RecordStoreService, SourceControlService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub source_control: Arc<dyn SourceControlService>,
    pub record_store: Arc<dyn RecordStoreService>,
    /// `None` when summarization is disabled.
    pub language_model: Option<Arc<dyn LanguageModelService>>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        source_control: Arc<dyn SourceControlService>,
        record_store: Arc<dyn RecordStoreService>,
        language_model: Option<Arc<dyn LanguageModelService>>,
    ) -> Self {
        Self {
            config,
            source_control,
            record_store,
            language_model,
        }
    }
}
