//! Configuration file loading for llm-relay
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LLM_RELAY_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./llm-relay.toml` or `./.llm-relay.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/llm-relay/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileContinuationConfig, FileExclusionsConfig,
    FileLoggingConfig, FileProviderConfig,
};
pub use loader::ConfigLoader;
