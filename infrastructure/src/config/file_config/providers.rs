//! Provider configuration from TOML (`[[providers]]` tables and `[routing]`)

use relay_domain::Model;
use serde::{Deserialize, Serialize};

fn default_priority() -> u32 {
    100
}

/// One OpenAI-compatible backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProviderConfig {
    /// Identifier used for exclusion and explicit selection.
    pub id: String,
    /// Base URL of the chat completions API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Direct API key (prefer `api_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Models this provider serves; empty means any model.
    #[serde(default)]
    pub models: Vec<String>,
    /// Rank among candidates, lower first.
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Free-form capability tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FileProviderConfig {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            api_key_env: None,
            api_key: None,
            models: Vec::new(),
            priority: default_priority(),
            tags: Vec::new(),
        }
    }

    /// Whether this provider declares support for `model`.
    pub fn serves(&self, model: &Model) -> bool {
        self.models.is_empty() || self.models.iter().any(|m| m == model.as_str())
    }

    /// Declared models as domain values (empty means any model).
    pub fn parsed_models(&self) -> Vec<Model> {
        self.models.iter().map(|m| Model::from_name(m)).collect()
    }

    /// API key from the direct value, falling back to the environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|key| !key.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_optional_fields() {
        let toml_str = r#"
id = "local"
base_url = "http://localhost:8080/v1"
"#;
        let config: FileProviderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.priority, 100);
        assert!(config.models.is_empty());
        assert!(config.serves(&Model::Gpt4o));
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_serves_only_listed_models() {
        let mut config = FileProviderConfig::new("p", "http://x");
        config.models = vec!["gpt-4o".into(), "my-model".into()];
        assert!(config.serves(&Model::Gpt4o));
        assert!(config.serves(&Model::Custom("my-model".into())));
        assert!(!config.serves(&Model::Gpt41));
    }

    #[test]
    fn test_direct_key_wins_over_env() {
        let mut config = FileProviderConfig::new("p", "http://x");
        config.api_key = Some("direct".into());
        config.api_key_env = Some("LLM_RELAY_TEST_UNSET_KEY_VAR".into());
        assert_eq!(config.resolve_api_key().as_deref(), Some("direct"));
    }
}
