//! Progress notification port
//!
//! Defines the interface for reporting what the continuation engine is doing.

use relay_domain::{CompletionVerdict, ProviderId, SessionState};

/// Callback for progress updates during a generation request
///
/// Implementations live in the presentation layer. Every method has a
/// no-op default so reporters only override what they display.
pub trait ContinuationProgress: Send + Sync {
    /// Called when a provider has been chosen for the request
    fn on_provider_selected(&self, _provider: &ProviderId) {}

    /// Called after each completeness evaluation
    fn on_verdict(&self, _verdict: &CompletionVerdict) {}

    /// Called before each continuation call (`attempt` is 1-based)
    fn on_continuation_start(&self, _attempt: u32, _max_attempts: u32) {}

    /// Called when a failed provider is replaced mid-session
    fn on_provider_replaced(&self, _failed: &ProviderId, _next: &ProviderId) {}

    /// Called once when the session reaches a terminal state
    fn on_session_end(&self, _state: SessionState) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ContinuationProgress for NoProgress {}
