//! Completeness detection use case
//!
//! Combines the pure heuristic pass with an optional LLM-judge pass into a
//! single [`CompletionVerdict`]. The judge is reached through the
//! [`CompletionJudge`] seam; [`ProviderJudge`] is the production judge that
//! routes a yes/no prompt through the provider selector.

use crate::config::DetectionPolicy;
use crate::use_cases::select_provider::ProviderSelector;
use async_trait::async_trait;
use relay_domain::{
    CompletionVerdict, GenerationRequest, PromptTemplate, VerdictReason, evaluate_heuristics,
    parse_judge_answer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one judge consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeOutcome {
    Complete,
    Incomplete,
    /// The judge answered but the answer could not be parsed.
    Inconclusive,
    /// No judge provider, a transport failure, or a timeout.
    Unavailable,
}

/// Secondary completeness oracle
#[async_trait]
pub trait CompletionJudge: Send + Sync {
    /// Ask whether `text` fully answers `request`. Never fails; problems
    /// reaching the judge are reported as [`JudgeOutcome::Unavailable`].
    async fn judge(&self, request: &GenerationRequest, text: &str) -> JudgeOutcome;
}

/// Judge that asks `request.completion_model` through the provider selector
pub struct ProviderJudge {
    selector: Arc<ProviderSelector>,
    timeout: Duration,
}

impl ProviderJudge {
    pub fn new(selector: Arc<ProviderSelector>, timeout: Duration) -> Self {
        Self { selector, timeout }
    }
}

#[async_trait]
impl CompletionJudge for ProviderJudge {
    async fn judge(&self, request: &GenerationRequest, text: &str) -> JudgeOutcome {
        let exclusions = match self.selector.exclusion_snapshot() {
            Ok(exclusions) => exclusions,
            Err(e) => {
                warn!("Judge skipped, exclusion list unreadable: {}", e);
                return JudgeOutcome::Unavailable;
            }
        };
        let judge_model = &request.completion_model;
        let selected = match self.selector.best_provider(judge_model, &exclusions) {
            Ok(selected) => selected,
            Err(e) => {
                debug!("Judge skipped: {}", e);
                return JudgeOutcome::Unavailable;
            }
        };

        let messages = PromptTemplate::judge_messages(request.prompt(), text);
        let call = selected.provider.generate(judge_model, &messages);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(answer)) => match parse_judge_answer(&answer) {
                Some(true) => JudgeOutcome::Complete,
                Some(false) => JudgeOutcome::Incomplete,
                None => {
                    debug!("Judge answer not understood: {:?}", answer);
                    JudgeOutcome::Inconclusive
                }
            },
            Ok(Err(e)) => {
                warn!("Judge {} failed: {}", selected.id(), e);
                JudgeOutcome::Unavailable
            }
            Err(_) => {
                warn!(
                    "Judge {} timed out after {:?}",
                    selected.id(),
                    self.timeout
                );
                JudgeOutcome::Unavailable
            }
        }
    }
}

/// Judge that is never available, for heuristic-only setups
pub struct NoJudge;

#[async_trait]
impl CompletionJudge for NoJudge {
    async fn judge(&self, _request: &GenerationRequest, _text: &str) -> JudgeOutcome {
        JudgeOutcome::Unavailable
    }
}

/// Decides whether accumulated text is a complete answer
pub struct CompletenessDetector {
    judge: Arc<dyn CompletionJudge>,
    policy: DetectionPolicy,
}

impl CompletenessDetector {
    pub fn new(judge: Arc<dyn CompletionJudge>, policy: DetectionPolicy) -> Self {
        Self { judge, policy }
    }

    pub fn policy(&self) -> DetectionPolicy {
        self.policy
    }

    /// Evaluate the full merged text, never just the latest fragment.
    pub async fn evaluate(&self, request: &GenerationRequest, text: &str) -> CompletionVerdict {
        let heuristic = evaluate_heuristics(text);

        match self.policy {
            DetectionPolicy::HeuristicOnly => heuristic,
            DetectionPolicy::Conjunctive => {
                if !heuristic.complete {
                    return heuristic;
                }
                match self.judge.judge(request, text).await {
                    JudgeOutcome::Complete => {
                        CompletionVerdict::complete(VerdictReason::LlmJudgedComplete)
                    }
                    JudgeOutcome::Incomplete => {
                        CompletionVerdict::incomplete(VerdictReason::LlmJudgedIncomplete)
                    }
                    JudgeOutcome::Inconclusive => {
                        CompletionVerdict::complete(VerdictReason::JudgeInconclusive)
                    }
                    JudgeOutcome::Unavailable => {
                        CompletionVerdict::complete(VerdictReason::JudgeUnavailable)
                    }
                }
            }
            DetectionPolicy::JudgePreferred => match self.judge.judge(request, text).await {
                JudgeOutcome::Complete => {
                    CompletionVerdict::complete(VerdictReason::LlmJudgedComplete)
                }
                JudgeOutcome::Incomplete => {
                    CompletionVerdict::incomplete(VerdictReason::LlmJudgedIncomplete)
                }
                outcome if heuristic.complete => CompletionVerdict::complete(match outcome {
                    JudgeOutcome::Inconclusive => VerdictReason::JudgeInconclusive,
                    _ => VerdictReason::JudgeUnavailable,
                }),
                _ => heuristic,
            },
        }
    }
}
