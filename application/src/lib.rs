//! Application layer for llm-relay
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ContinuationParams, DetectionPolicy};
pub use ports::{
    exclusion_store::{ExclusionStore, ExclusionStoreError},
    progress::{ContinuationProgress, NoProgress},
    provider::{ProviderError, StreamHandle, TextGenerationProvider},
    provider_catalog::ProviderCatalog,
    session_logger::{NoSessionLogger, SessionEvent, SessionLogger},
};
pub use use_cases::continue_generation::{
    ContinuationOrchestrator, GenerateError, GenerationOutcome,
};
pub use use_cases::detect_completion::{
    CompletenessDetector, CompletionJudge, JudgeOutcome, NoJudge, ProviderJudge,
};
pub use use_cases::generate::GenerateUseCase;
pub use use_cases::select_provider::{
    ProviderSelector, RankedProvider, SelectedProvider, SelectionError,
};
pub use use_cases::stream_merge::{MergeEvent, MergedStream, StreamMerger};
