//! Model value object representing a text-generation model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text-generation models known to the relay (Value Object)
///
/// Providers are resolved per model, so the model name is the key into the
/// provider catalog. Names not listed here are carried as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    O3Mini,
    // Anthropic models
    Claude37Sonnet,
    ClaudeSonnet4,
    // Google models
    Gemini25Pro,
    Gemini25Flash,
    // Open-weight models
    Llama33_70b,
    DeepSeekV3,
    DeepSeekR1,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::O3Mini => "o3-mini",
            Model::Claude37Sonnet => "claude-3.7-sonnet",
            Model::ClaudeSonnet4 => "claude-sonnet-4",
            Model::Gemini25Pro => "gemini-2.5-pro",
            Model::Gemini25Flash => "gemini-2.5-flash",
            Model::Llama33_70b => "llama-3.3-70b",
            Model::DeepSeekV3 => "deepseek-v3",
            Model::DeepSeekR1 => "deepseek-r1",
            Model::Custom(s) => s,
        }
    }

    /// The model consulted as completeness judge when a request names none
    pub fn default_judge() -> Model {
        Model::Claude37Sonnet
    }

    /// Check if this is an Anthropic model
    pub fn is_claude(&self) -> bool {
        matches!(self, Model::Claude37Sonnet | Model::ClaudeSonnet4)
    }

    /// Check if this is an OpenAI model
    pub fn is_gpt(&self) -> bool {
        matches!(
            self,
            Model::Gpt4o | Model::Gpt4oMini | Model::Gpt41 | Model::O3Mini
        )
    }
}

impl Default for Model {
    /// Returns the default generation model (GPT-4o mini)
    fn default() -> Self {
        Model::Gpt4oMini
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from_name(s))
    }
}

impl Model {
    /// Infallible name lookup; unknown names become [`Model::Custom`].
    pub fn from_name(s: &str) -> Model {
        match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "o3-mini" => Model::O3Mini,
            "claude-3.7-sonnet" => Model::Claude37Sonnet,
            "claude-sonnet-4" => Model::ClaudeSonnet4,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "llama-3.3-70b" => Model::Llama33_70b,
            "deepseek-v3" => Model::DeepSeekV3,
            "deepseek-r1" => Model::DeepSeekR1,
            other => Model::Custom(other.to_string()),
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from_name(&s))
    }
}
