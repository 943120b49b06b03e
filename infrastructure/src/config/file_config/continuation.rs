//! Continuation configuration from TOML (`[continuation]` section)

use relay_application::{ContinuationParams, DetectionPolicy};
use relay_domain::{DEFAULT_CONTINUATION_ATTEMPTS, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw continuation configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContinuationConfig {
    /// Continue truncated answers automatically
    pub auto_continue: bool,
    /// Judge model for the completeness check
    pub completion_model: Model,
    /// Maximum continuation calls beyond the initial call
    pub continuation_attempts: u32,
    /// Timeout in seconds for judge calls
    pub judge_timeout_seconds: u64,
    /// Timeout in seconds for provider calls (0 disables)
    pub request_timeout_seconds: Option<u64>,
    /// How heuristic and judge votes are combined
    pub policy: DetectionPolicy,
}

impl Default for FileContinuationConfig {
    fn default() -> Self {
        Self {
            auto_continue: true,
            completion_model: Model::default_judge(),
            continuation_attempts: DEFAULT_CONTINUATION_ATTEMPTS,
            judge_timeout_seconds: 30,
            request_timeout_seconds: Some(120),
            policy: DetectionPolicy::default(),
        }
    }
}

impl FileContinuationConfig {
    /// Convert to application-layer parameters.
    pub fn to_params(&self) -> ContinuationParams {
        let request_timeout = self
            .request_timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        ContinuationParams::default()
            .with_auto_continue(self.auto_continue)
            .with_completion_model(self.completion_model.clone())
            .with_continuation_attempts(self.continuation_attempts)
            .with_judge_timeout(Duration::from_secs(self.judge_timeout_seconds))
            .with_request_timeout(request_timeout)
            .with_policy(self.policy)
    }
}
