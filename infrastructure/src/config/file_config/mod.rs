//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod continuation;
mod providers;

pub use continuation::FileContinuationConfig;
pub use providers::FileProviderConfig;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("provider id cannot be empty")]
    EmptyProviderId,

    #[error("duplicate provider id: {0}")]
    DuplicateProviderId(String),

    #[error("provider {0} has an empty base_url")]
    EmptyBaseUrl(String),

    #[error("judge_timeout_seconds cannot be 0")]
    InvalidJudgeTimeout,
}

/// Exclusion list location (`[exclusions]` section)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExclusionsConfig {
    /// JSON file holding the excluded provider ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FileExclusionsConfig {
    /// Configured path, or `<config dir>/llm-relay/provider_exclusions.json`.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::config_dir().map(|d| d.join("llm-relay").join("provider_exclusions.json"))
        })
    }
}

/// Structured logging settings (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL session log path; unset disables the session log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_log: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Continuation engine settings
    pub continuation: FileContinuationConfig,
    /// Exclusion list settings
    pub exclusions: FileExclusionsConfig,
    /// Session log settings
    pub logging: FileLoggingConfig,
    /// Backends available to the relay
    pub providers: Vec<FileProviderConfig>,
    /// Model name to ordered provider ids; overrides priority for that model
    pub routing: BTreeMap<String, Vec<String>>,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.continuation.judge_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidJudgeTimeout);
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            let id = provider.id.trim();
            if id.is_empty() {
                return Err(ConfigValidationError::EmptyProviderId);
            }
            if !seen.insert(id) {
                return Err(ConfigValidationError::DuplicateProviderId(id.to_string()));
            }
            if provider.base_url.trim().is_empty() {
                return Err(ConfigValidationError::EmptyBaseUrl(id.to_string()));
            }
        }

        Ok(())
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for provider in &mut config.providers {
            if provider.api_key.is_some() {
                provider.api_key = Some("<redacted>".to_string());
            }
        }
        config
    }
}
