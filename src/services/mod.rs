pub mod language_model;
pub mod record_store;
pub mod source_control;

pub use language_model::LanguageModelService;
pub use record_store::RecordStoreService;
pub use source_control::SourceControlService;
