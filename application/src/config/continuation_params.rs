//! Continuation parameters: engine-wide defaults and switches.
//!
//! [`ContinuationParams`] groups the static parameters that control the
//! continuation loop. Per-request fields on [`GenerationRequest`] take these
//! as defaults; the global `auto_continue` switch can only turn continuation
//! off, never force it on for a request that opted out.

use relay_domain::{DEFAULT_CONTINUATION_ATTEMPTS, GenerationRequest, Message, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the heuristic pass and the judge pass are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Either pass voting incomplete continues; both must vote complete
    /// (or the judge must be unavailable) to stop.
    #[default]
    Conjunctive,
    /// Never consult the judge.
    HeuristicOnly,
    /// The judge decides both directions; heuristics only when it is unavailable.
    JudgePreferred,
}

impl DetectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionPolicy::Conjunctive => "conjunctive",
            DetectionPolicy::HeuristicOnly => "heuristic_only",
            DetectionPolicy::JudgePreferred => "judge_preferred",
        }
    }
}

impl std::fmt::Display for DetectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DetectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "conjunctive" => Ok(DetectionPolicy::Conjunctive),
            "heuristic_only" | "heuristic" => Ok(DetectionPolicy::HeuristicOnly),
            "judge_preferred" | "judge" => Ok(DetectionPolicy::JudgePreferred),
            other => Err(format!("unknown detection policy: {}", other)),
        }
    }
}

/// Continuation loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationParams {
    /// Global switch; `false` disables continuation for every request.
    pub auto_continue: bool,
    /// Judge model used when a request does not name one.
    pub completion_model: Model,
    /// Continuation bound used when a request does not set one.
    pub continuation_attempts: u32,
    /// Upper bound on a single judge call.
    pub judge_timeout: Duration,
    /// Upper bound on a single provider call (`None` = unbounded).
    pub request_timeout: Option<Duration>,
    /// Combination rule for the detector passes.
    pub policy: DetectionPolicy,
}

impl Default for ContinuationParams {
    fn default() -> Self {
        Self {
            auto_continue: true,
            completion_model: Model::default_judge(),
            continuation_attempts: DEFAULT_CONTINUATION_ATTEMPTS,
            judge_timeout: Duration::from_secs(30),
            request_timeout: Some(Duration::from_secs(120)),
            policy: DetectionPolicy::default(),
        }
    }
}

impl ContinuationParams {
    // ==================== Builder Methods ====================

    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    pub fn with_completion_model(mut self, model: Model) -> Self {
        self.completion_model = model;
        self
    }

    pub fn with_continuation_attempts(mut self, attempts: u32) -> Self {
        self.continuation_attempts = attempts;
        self
    }

    pub fn with_judge_timeout(mut self, timeout: Duration) -> Self {
        self.judge_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: DetectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a request carrying these parameters as its defaults.
    pub fn request(&self, model: Model, messages: Vec<Message>) -> GenerationRequest {
        GenerationRequest::new(model, messages)
            .with_auto_continue(self.auto_continue)
            .with_completion_model(self.completion_model.clone())
            .with_continuation_attempts(self.continuation_attempts)
    }

    /// Apply the global switch to a caller-built request.
    pub fn normalize(&self, mut request: GenerationRequest) -> GenerationRequest {
        request.auto_continue = request.auto_continue && self.auto_continue;
        request
    }
}
