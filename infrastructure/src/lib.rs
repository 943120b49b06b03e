//! Infrastructure layer for llm-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration loading, provider backends,
//! the provider catalog, exclusion persistence and session logging.

pub mod catalog;
pub mod config;
pub mod exclusion;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use catalog::{CatalogEntry, StaticProviderCatalog};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileContinuationConfig,
    FileExclusionsConfig, FileLoggingConfig, FileProviderConfig,
};
pub use exclusion::{JsonFileExclusionStore, MemoryExclusionStore};
pub use logging::JsonlSessionLogger;
pub use providers::OpenAiCompatibleProvider;
