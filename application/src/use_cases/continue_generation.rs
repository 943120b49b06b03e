//! Continuation use case
//!
//! Drives one [`ContinuationSession`] to a terminal state:
//!
//! 1. call the selected provider for the initial fragment
//! 2. ask the [`CompletenessDetector`] about the merged text
//! 3. while incomplete and attempts remain, ask for a continuation and merge it
//!
//! A transport failure at any step hands the session to the next candidate
//! via [`ProviderSelector::replace_on_failure`]; that retry does not consume
//! a continuation attempt. When the initial call cannot be served the
//! request fails; after that, the session always yields its merged text.

use crate::ports::exclusion_store::ExclusionStoreError;
use crate::ports::progress::{ContinuationProgress, NoProgress};
use crate::ports::provider::ProviderError;
use crate::ports::session_logger::{NoSessionLogger, SessionEvent, SessionLogger};
use crate::use_cases::detect_completion::CompletenessDetector;
use crate::use_cases::select_provider::{ProviderSelector, SelectedProvider, SelectionError};
use crate::use_cases::shared::{CallOutcome, call_provider, check_cancelled};
use async_trait::async_trait;
use relay_domain::{
    AbortReason, CompletionVerdict, ContinuationSession, DomainError, ExclusionSet,
    GenerationRequest, Message, Model, PromptTemplate, ProviderId, SessionState,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a generation request without a result
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    ExclusionStore(#[from] ExclusionStoreError),

    #[error("Session error: {0}")]
    Session(#[from] DomainError),

    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerateError {
    /// True when no provider could serve the request.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, GenerateError::Selection(e) if e.is_provider_unavailable())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerateError::Cancelled)
    }
}

/// Final result of a generation request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Merged text of every fragment, overlap trimmed.
    pub text: String,
    pub state: SessionState,
    /// Set unless the detector judged the text complete.
    pub possibly_incomplete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<AbortReason>,
    /// Provider that produced the last fragment.
    pub provider: ProviderId,
    pub providers_tried: Vec<ProviderId>,
    pub fragments: usize,
    pub continuation_attempts: u32,
    pub reselections: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verdict: Option<CompletionVerdict>,
}

impl GenerationOutcome {
    pub fn from_session(session: &ContinuationSession, last_verdict: Option<CompletionVerdict>) -> Self {
        Self {
            text: session.merged_text().to_string(),
            state: session.state(),
            possibly_incomplete: session.is_possibly_incomplete(),
            abort_reason: session.abort_reason().cloned(),
            provider: session.provider().clone(),
            providers_tried: session.tried_providers().to_vec(),
            fragments: session.fragments().len(),
            continuation_attempts: session.attempts(),
            reselections: session.reselections(),
            last_verdict,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.abort_reason, Some(AbortReason::Cancelled))
    }
}

/// Receiver for text that extended the merged answer.
#[async_trait]
pub(crate) trait FragmentSink: Send {
    /// Forward `text`; `false` means the consumer is gone.
    async fn forward(&mut self, text: &str) -> bool;
}

struct DiscardSink;

#[async_trait]
impl FragmentSink for DiscardSink {
    async fn forward(&mut self, _text: &str) -> bool {
        true
    }
}

/// Runs the bounded continuation loop for one request
pub struct ContinuationOrchestrator {
    selector: Arc<ProviderSelector>,
    detector: Arc<CompletenessDetector>,
    request_timeout: Option<Duration>,
    logger: Arc<dyn SessionLogger>,
}

impl ContinuationOrchestrator {
    pub fn new(
        selector: Arc<ProviderSelector>,
        detector: Arc<CompletenessDetector>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            selector,
            detector,
            request_timeout,
            logger: Arc::new(NoSessionLogger),
        }
    }

    /// Set a structured session logger (JSONL transcript).
    pub fn with_logger(mut self, logger: Arc<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub(crate) fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Run without progress reporting.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        first: SelectedProvider,
        exclusions: &ExclusionSet,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerateError> {
        self.run_with_progress(request, first, exclusions, cancel, &NoProgress)
            .await
    }

    /// Run the session to a terminal state, starting at `first`.
    ///
    /// `exclusions` is the snapshot taken when `first` was selected; it is
    /// reused for every reselection of this request.
    pub async fn run_with_progress(
        &self,
        request: &GenerationRequest,
        first: SelectedProvider,
        exclusions: &ExclusionSet,
        cancel: &CancellationToken,
        progress: &dyn ContinuationProgress,
    ) -> Result<GenerationOutcome, GenerateError> {
        check_cancelled(cancel)?;

        let mut current = first;
        let mut session =
            ContinuationSession::new(current.id().clone(), request.continuation_attempts);
        self.log_session_start(request, &session);
        progress.on_provider_selected(current.id());

        let initial = self
            .fetch(
                &request.model,
                &request.messages,
                &mut current,
                &mut session,
                exclusions,
                cancel,
                progress,
            )
            .await?;
        let Some(text) = initial else {
            return Err(GenerateError::Cancelled);
        };
        self.record_fragment(&mut session, text)?;

        let verdict = self
            .drive(
                request,
                &mut session,
                &mut current,
                exclusions,
                cancel,
                progress,
                &mut DiscardSink,
            )
            .await?;
        Ok(self.finish(&session, verdict, progress))
    }

    /// Evaluate and continue until the session is terminal.
    ///
    /// Expects the initial fragment to be recorded already. Each merged
    /// continuation is handed to `sink` before the next evaluation.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn drive(
        &self,
        request: &GenerationRequest,
        session: &mut ContinuationSession,
        current: &mut SelectedProvider,
        exclusions: &ExclusionSet,
        cancel: &CancellationToken,
        progress: &dyn ContinuationProgress,
        sink: &mut dyn FragmentSink,
    ) -> Result<Option<CompletionVerdict>, GenerateError> {
        if !request.auto_continue {
            // No verdict was computed, so the text cannot be reported complete.
            debug!("Auto-continue disabled, returning the first fragment unchecked");
            session.exhaust()?;
            return Ok(None);
        }

        let mut last_verdict = None;
        loop {
            let Some(verdict) = self.evaluate(request, session.merged_text(), cancel).await else {
                session.abort(AbortReason::Cancelled)?;
                break;
            };
            debug!(
                "Verdict after {} fragment(s): complete={} ({})",
                session.fragments().len(),
                verdict.complete,
                verdict.reason
            );
            progress.on_verdict(&verdict);
            self.logger.log(SessionEvent::new(
                "verdict",
                serde_json::json!({
                    "complete": verdict.complete,
                    "reason": verdict.reason,
                    "fragments": session.fragments().len(),
                }),
            ));
            last_verdict = Some(verdict);

            if verdict.complete {
                session.complete()?;
                break;
            }
            if !session.has_attempts_left() {
                info!(
                    "Continuation attempts exhausted ({}), returning partial text",
                    session.max_attempts()
                );
                session.exhaust()?;
                break;
            }

            let attempt = session.begin_continuation()?;
            info!(
                "Continuing with {} (attempt {}/{})",
                session.provider(),
                attempt,
                session.max_attempts()
            );
            progress.on_continuation_start(attempt, session.max_attempts());
            self.logger.log(SessionEvent::new(
                "continuation",
                serde_json::json!({
                    "attempt": attempt,
                    "max_attempts": session.max_attempts(),
                    "provider": session.provider(),
                }),
            ));

            let messages =
                PromptTemplate::continuation_messages(&request.messages, session.merged_text());
            let fetched = self
                .fetch(
                    &request.model,
                    &messages,
                    current,
                    session,
                    exclusions,
                    cancel,
                    progress,
                )
                .await;
            match fetched {
                Ok(Some(text)) => {
                    let added = self.record_fragment(session, text)?;
                    if !added.is_empty() && !sink.forward(&added).await {
                        debug!("Consumer went away, stopping continuation");
                        session.abort(AbortReason::Cancelled)?;
                        break;
                    }
                }
                Ok(None) => {
                    session.abort(AbortReason::Cancelled)?;
                    break;
                }
                Err(GenerateError::Selection(e)) => {
                    warn!("No provider left to continue: {}", e);
                    session.abort(AbortReason::ProvidersExhausted(e.to_string()))?;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(last_verdict)
    }

    /// Call the current provider, failing over until one answers.
    ///
    /// Returns `Ok(None)` on cancellation and `Err(Selection)` once no
    /// untried candidate remains.
    #[allow(clippy::too_many_arguments)]
    async fn fetch(
        &self,
        model: &Model,
        messages: &[Message],
        current: &mut SelectedProvider,
        session: &mut ContinuationSession,
        exclusions: &ExclusionSet,
        cancel: &CancellationToken,
        progress: &dyn ContinuationProgress,
    ) -> Result<Option<String>, GenerateError> {
        loop {
            let call = current.provider.generate(model, messages);
            match call_provider(cancel, self.request_timeout, call).await {
                CallOutcome::Done(text) => return Ok(Some(text)),
                CallOutcome::Cancelled => return Ok(None),
                CallOutcome::Failed(err) => {
                    self.reselect(model, current, session, exclusions, &err, progress)?;
                }
            }
        }
    }

    /// Replace the current provider after `err`.
    pub(crate) fn reselect(
        &self,
        model: &Model,
        current: &mut SelectedProvider,
        session: &mut ContinuationSession,
        exclusions: &ExclusionSet,
        err: &ProviderError,
        progress: &dyn ContinuationProgress,
    ) -> Result<(), GenerateError> {
        warn!("Provider {} failed: {}", current.id(), err);
        let next =
            self.selector
                .replace_on_failure(model, exclusions, session.tried_providers())?;

        info!("Replacing provider {} with {}", current.id(), next.id());
        progress.on_provider_replaced(current.id(), next.id());
        self.logger.log(SessionEvent::new(
            "reselection",
            serde_json::json!({
                "failed": current.id(),
                "next": next.id(),
                "error": err.to_string(),
            }),
        ));
        session.replace_provider(next.id().clone())?;
        *current = next;
        Ok(())
    }

    /// Merge `text` into the session; returns the part that was new.
    pub(crate) fn record_fragment(
        &self,
        session: &mut ContinuationSession,
        text: String,
    ) -> Result<String, GenerateError> {
        let added = session.push_fragment(text)?.to_string();
        if let Some(fragment) = session.fragments().last() {
            debug!(
                "Fragment {} from {}: {} bytes, {} overlapping",
                fragment.index(),
                fragment.provider(),
                fragment.text().len(),
                fragment.overlap()
            );
            self.logger.log(SessionEvent::new(
                "fragment",
                serde_json::json!({
                    "index": fragment.index(),
                    "provider": fragment.provider(),
                    "bytes": fragment.text().len(),
                    "overlap": fragment.overlap(),
                }),
            ));
        }
        Ok(added)
    }

    async fn evaluate(
        &self,
        request: &GenerationRequest,
        text: &str,
        cancel: &CancellationToken,
    ) -> Option<CompletionVerdict> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            verdict = self.detector.evaluate(request, text) => Some(verdict),
        }
    }

    pub(crate) fn log_session_start(
        &self,
        request: &GenerationRequest,
        session: &ContinuationSession,
    ) {
        info!(
            "Generating with {} via {} (auto_continue={}, attempts={})",
            request.model,
            session.provider(),
            request.auto_continue,
            session.max_attempts()
        );
        self.logger.log(SessionEvent::new(
            "session_start",
            serde_json::json!({
                "model": request.model,
                "provider": session.provider(),
                "stream": request.stream,
                "auto_continue": request.auto_continue,
                "completion_model": request.completion_model,
                "max_attempts": session.max_attempts(),
            }),
        ));
    }

    /// Report the terminal state and build the outcome.
    pub(crate) fn finish(
        &self,
        session: &ContinuationSession,
        last_verdict: Option<CompletionVerdict>,
        progress: &dyn ContinuationProgress,
    ) -> GenerationOutcome {
        info!(
            "Session {} after {} fragment(s), {} continuation(s), {} reselection(s)",
            session.state(),
            session.fragments().len(),
            session.attempts(),
            session.reselections()
        );
        progress.on_session_end(session.state());
        let outcome = GenerationOutcome::from_session(session, last_verdict);
        self.logger.log(SessionEvent::new(
            "session_end",
            serde_json::json!({
                "state": outcome.state,
                "provider": outcome.provider,
                "possibly_incomplete": outcome.possibly_incomplete,
                "abort_reason": outcome.abort_reason,
                "fragments": outcome.fragments,
                "continuation_attempts": outcome.continuation_attempts,
                "reselections": outcome.reselections,
                "bytes": outcome.text.len(),
            }),
        ));
        outcome
    }
}
