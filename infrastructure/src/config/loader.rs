//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

const APP_DIR: &str = "llm-relay";
const PROJECT_FILES: [&str; 2] = ["llm-relay.toml", ".llm-relay.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Prefix of environment variables overriding file settings.
    ///
    /// Nested keys use `__`: `LLM_RELAY_CONTINUATION__CONTINUATION_ATTEMPTS=5`.
    pub const ENV_PREFIX: &'static str = "LLM_RELAY_";

    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `LLM_RELAY_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./llm-relay.toml` or `./.llm-relay.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/llm-relay/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged figment, before extraction.
    pub fn figment(config_path: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/llm-relay/config.toml` if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for debugging)
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", Self::ENV_PREFIX));

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            lines.push(format!("  [{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use relay_domain::Model;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.continuation.auto_continue);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("llm-relay"));
    }

    #[test]
    fn test_project_file_and_env_override() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            jail.create_file(
                "llm-relay.toml",
                r#"
[continuation]
continuation_attempts = 5
completion_model = "gpt-4.1"

[[providers]]
id = "local"
base_url = "http://localhost:8080/v1"
"#,
            )?;
            jail.set_env("LLM_RELAY_CONTINUATION__AUTO_CONTINUE", "false");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.continuation.continuation_attempts, 5);
            assert_eq!(config.continuation.completion_model, Model::Gpt41);
            assert!(!config.continuation.auto_continue);
            assert_eq!(config.providers.len(), 1);
            assert_eq!(config.providers[0].id, "local");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path_overrides_project_file() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            jail.create_file(".llm-relay.toml", "[continuation]\ncontinuation_attempts = 2\n")?;
            jail.create_file("custom.toml", "[continuation]\ncontinuation_attempts = 7\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| *e)?;
            assert_eq!(config.continuation.continuation_attempts, 7);

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.continuation.continuation_attempts, 2);
            Ok(())
        });
    }

    #[test]
    fn test_global_config_is_lowest_file_priority() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", dir);
            std::fs::create_dir_all(jail.directory().join("llm-relay")).unwrap();
            jail.create_file(
                "llm-relay/config.toml",
                "[continuation]\njudge_timeout_seconds = 9\ncontinuation_attempts = 4\n",
            )?;
            jail.create_file("llm-relay.toml", "[continuation]\ncontinuation_attempts = 6\n")?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.continuation.judge_timeout_seconds, 9);
            assert_eq!(config.continuation.continuation_attempts, 6);
            Ok(())
        });
    }

    #[test]
    fn test_describe_sources_mentions_env_prefix() {
        let lines = ConfigLoader::describe_sources(None);
        assert!(lines.iter().any(|l| l.contains("LLM_RELAY_")));
        assert!(lines.last().unwrap().contains("Default"));
    }
}
