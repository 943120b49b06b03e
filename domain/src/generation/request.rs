//! Generation request value object

use crate::core::model::Model;
use crate::providers::descriptor::ProviderId;
use crate::session::entities::{Message, last_user_content};
use serde::{Deserialize, Serialize};

/// Default upper bound on continuation calls beyond the initial call.
pub const DEFAULT_CONTINUATION_ATTEMPTS: u32 = 3;

fn default_auto_continue() -> bool {
    true
}

fn default_continuation_attempts() -> u32 {
    DEFAULT_CONTINUATION_ATTEMPTS
}

/// A caller's request for generated text.
///
/// Field names match the request body consumed by the relay:
///
/// ```json
/// {
///   "model": "gpt-4o-mini",
///   "messages": [{"role": "user", "content": "..."}],
///   "provider": "Blackbox",
///   "stream": true,
///   "auto_continue": true,
///   "completion_model": "claude-3.7-sonnet",
///   "continuation_attempts": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: Model,
    pub messages: Vec<Message>,
    /// Explicitly requested provider; bypasses ranked selection.
    #[serde(default)]
    pub provider: Option<ProviderId>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default = "default_auto_continue")]
    pub auto_continue: bool,
    /// Model consulted as completeness judge.
    #[serde(default = "Model::default_judge")]
    pub completion_model: Model,
    /// Maximum continuation calls beyond the initial call.
    #[serde(default = "default_continuation_attempts")]
    pub continuation_attempts: u32,
}

impl GenerationRequest {
    pub fn new(model: Model, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            provider: None,
            stream: false,
            auto_continue: true,
            completion_model: Model::default_judge(),
            continuation_attempts: DEFAULT_CONTINUATION_ATTEMPTS,
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
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

    /// The prompt the answer is for (last user message).
    pub fn prompt(&self) -> Option<&str> {
        last_user_content(&self.messages)
    }
}
