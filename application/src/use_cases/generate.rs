//! Generate use case
//!
//! Entry point for one generation request: applies the engine-wide
//! parameters, takes an exclusion snapshot, selects the first provider, then
//! hands off to the [`ContinuationOrchestrator`] (blocking) or the
//! [`StreamMerger`] (streaming). Selection errors surface here, before any
//! provider is called.

use crate::config::{ContinuationParams, DetectionPolicy};
use crate::ports::progress::{ContinuationProgress, NoProgress};
use crate::ports::session_logger::{NoSessionLogger, SessionLogger};
use crate::use_cases::continue_generation::{
    ContinuationOrchestrator, GenerateError, GenerationOutcome,
};
use crate::use_cases::detect_completion::{
    CompletenessDetector, CompletionJudge, NoJudge, ProviderJudge,
};
use crate::use_cases::select_provider::{ProviderSelector, SelectedProvider};
use crate::use_cases::stream_merge::{MergedStream, StreamMerger};
use relay_domain::{ExclusionSet, GenerationRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Use case for generating (and auto-continuing) a response
pub struct GenerateUseCase {
    selector: Arc<ProviderSelector>,
    orchestrator: Arc<ContinuationOrchestrator>,
    merger: StreamMerger,
    params: ContinuationParams,
}

impl GenerateUseCase {
    pub fn new(selector: Arc<ProviderSelector>, params: ContinuationParams) -> Self {
        Self::with_logger(selector, params, Arc::new(NoSessionLogger))
    }

    /// Build the full pipeline, recording sessions to `logger`.
    pub fn with_logger(
        selector: Arc<ProviderSelector>,
        params: ContinuationParams,
        logger: Arc<dyn SessionLogger>,
    ) -> Self {
        let judge: Arc<dyn CompletionJudge> = match params.policy {
            DetectionPolicy::HeuristicOnly => Arc::new(NoJudge),
            _ => Arc::new(ProviderJudge::new(selector.clone(), params.judge_timeout)),
        };
        let detector = Arc::new(CompletenessDetector::new(judge, params.policy));
        let orchestrator = Arc::new(
            ContinuationOrchestrator::new(selector.clone(), detector, params.request_timeout)
                .with_logger(logger),
        );
        Self {
            merger: StreamMerger::new(orchestrator.clone()),
            selector,
            orchestrator,
            params,
        }
    }

    pub fn params(&self) -> &ContinuationParams {
        &self.params
    }

    pub fn selector(&self) -> &Arc<ProviderSelector> {
        &self.selector
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerateError> {
        self.execute_with_progress(request, cancel, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        progress: &dyn ContinuationProgress,
    ) -> Result<GenerationOutcome, GenerateError> {
        let (request, first, exclusions) = self.prepare(request)?;
        self.orchestrator
            .run_with_progress(&request, first, &exclusions, cancel, progress)
            .await
    }

    /// Start a streaming generation.
    ///
    /// Fails synchronously when no provider can be selected; later failures
    /// arrive on the stream.
    pub fn stream(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        progress: Arc<dyn ContinuationProgress>,
    ) -> Result<MergedStream, GenerateError> {
        let (request, first, exclusions) = self.prepare(request)?;
        Ok(self
            .merger
            .start(request, first, exclusions, cancel, progress))
    }

    fn prepare(
        &self,
        request: GenerationRequest,
    ) -> Result<(GenerationRequest, SelectedProvider, ExclusionSet), GenerateError> {
        let request = self.params.normalize(request);
        let exclusions = self.selector.exclusion_snapshot()?;
        let first = self
            .selector
            .select(&request.model, request.provider.as_ref(), &exclusions)?;
        Ok((request, first, exclusions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::select_provider::SelectionError;
    use crate::use_cases::stream_merge::MergeEvent;
    use crate::use_cases::testing::{ScriptedProvider, TestCatalog, TestExclusions, pid, text};
    use futures::StreamExt;
    use relay_domain::{Message, Model, SessionState};

    fn use_case(catalog: TestCatalog, excluded: &[&str], params: ContinuationParams) -> GenerateUseCase {
        let selector = Arc::new(ProviderSelector::new(
            Arc::new(catalog),
            TestExclusions::of(excluded),
        ));
        GenerateUseCase::new(selector, params)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(Model::Gpt4o, vec![Message::user("Summarize Rust.")])
    }

    #[tokio::test]
    async fn explicit_excluded_provider_fails_before_any_call() {
        let a = ScriptedProvider::new("A", vec![text("unused")]);
        let b = ScriptedProvider::new("B", vec![text("unused")]);
        let use_case = use_case(
            TestCatalog::new().with(a.clone(), 10).with(b.clone(), 20),
            &["B"],
            ContinuationParams::default(),
        );

        let request = request().with_provider(pid("B"));
        let err = use_case
            .execute(request.clone(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Selection(SelectionError::ProviderExcluded(_))
        ));

        let err = use_case
            .stream(request, &CancellationToken::new(), Arc::new(NoProgress))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            GenerateError::Selection(SelectionError::ProviderExcluded(_))
        ));
        assert_eq!(a.calls() + b.calls(), 0);
    }

    #[tokio::test]
    async fn global_switch_disables_continuation() {
        let a = ScriptedProvider::new("A", vec![text("Rust is fast and")]);
        let use_case = use_case(
            TestCatalog::new().with(a.clone(), 10),
            &[],
            ContinuationParams::default()
                .with_auto_continue(false)
                .with_policy(DetectionPolicy::HeuristicOnly),
        );

        let outcome = use_case
            .execute(request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.text, "Rust is fast and");
        assert_eq!(outcome.state, SessionState::Exhausted);
        assert!(outcome.last_verdict.is_none());
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test]
    async fn judge_runs_on_completion_model_providers() {
        let a = ScriptedProvider::new("A", vec![text("Rust is fast.")]);
        let judge = ScriptedProvider::new("J", vec![text("COMPLETE")]);
        let use_case = use_case(
            TestCatalog::new()
                .with_for(a.clone(), 10, Model::Gpt4o)
                .with_for(judge.clone(), 10, Model::Gpt41),
            &[],
            ContinuationParams::default(),
        );

        let request = request().with_completion_model(Model::Gpt41);
        let outcome = use_case
            .execute(request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.state, SessionState::Complete);
        assert_eq!(judge.calls(), 1);
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test]
    async fn streaming_and_blocking_agree_on_text() {
        let script = || vec![text("Ownership moves values and"), text("and borrows them.")];
        let blocking = use_case(
            TestCatalog::new().with(ScriptedProvider::new("A", script()), 10),
            &[],
            ContinuationParams::default().with_policy(DetectionPolicy::HeuristicOnly),
        );
        let streaming = use_case(
            TestCatalog::new().with(ScriptedProvider::new("A", script()), 10),
            &[],
            ContinuationParams::default().with_policy(DetectionPolicy::HeuristicOnly),
        );

        let outcome = blocking
            .execute(request(), &CancellationToken::new())
            .await
            .unwrap();

        let stream = streaming
            .stream(request().with_stream(true), &CancellationToken::new(), Arc::new(NoProgress))
            .unwrap();
        let events: Vec<MergeEvent> = stream.collect().await;
        let mut chunks = String::new();
        let mut streamed = None;
        for event in events {
            match event {
                MergeEvent::Chunk(text) => chunks.push_str(&text),
                MergeEvent::Finished(outcome) => streamed = Some(outcome),
                MergeEvent::Failed(e) => panic!("stream failed: {e}"),
            }
        }
        let streamed = streamed.unwrap();
        assert_eq!(outcome.text, "Ownership moves values and borrows them.");
        assert_eq!(streamed.text, outcome.text);
        assert_eq!(chunks, outcome.text);
    }
}
