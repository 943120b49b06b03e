//! Domain layer for llm-relay
//!
//! This crate contains the core types and pure algorithms of the relay.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Continuation
//!
//! Some providers stop generating before an answer is whole. The relay
//! detects truncation and keeps asking the provider to resume:
//!
//! - **Heuristics**: structural/lexical truncation signals ([`completion`])
//! - **Merge**: fragments are concatenated with repeated overlap trimmed ([`generation::merge`])
//! - **Session**: a bounded state machine per request ([`ContinuationSession`])
//!
//! ## Provider Selection
//!
//! Providers are ranked per model ([`ProviderDescriptor`]); an
//! [`ExclusionSet`] bars providers from both automatic and explicit selection.

pub mod completion;
pub mod core;
pub mod generation;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod util;

// Re-export commonly used types
pub use completion::{
    heuristics::{detect_truncation, evaluate_heuristics},
    judge::parse_judge_answer,
    verdict::{CompletionVerdict, HeuristicSignal, VerdictReason},
};
pub use core::{error::DomainError, model::Model};
pub use generation::{
    fragment::ResponseFragment,
    merge::{merge, overlap_len, trim_overlap},
    request::{DEFAULT_CONTINUATION_ATTEMPTS, GenerationRequest},
    session::{AbortReason, ContinuationSession, SessionState},
};
pub use prompt::PromptTemplate;
pub use providers::{
    descriptor::{ProviderDescriptor, ProviderId},
    exclusion::ExclusionSet,
};
pub use session::{
    entities::{Message, Role},
    stream::StreamEvent,
};
