//! Configuration management for Crisis Coach
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Crisis Coach
///
/// Holds the model endpoint settings used by the completion client and the
/// bind address for the HTTP API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Remote chat-completions endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key sent as a bearer token; `None` leaves every task endpoint
    /// answering with a configuration error
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with each request
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Base URL of the provider (the completions path is appended)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for a single completion call (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_model_name() -> String {
    "GLM-4.7-FlashX".to_string()
}

fn default_base_url() -> String {
    "https://open.bigmodel.cn".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            name: default_model_name(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ModelConfig {
    /// Returns the configured API key when it is present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Full chat-completions endpoint for the configured base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use crisis_coach::config::ModelConfig;
    ///
    /// let config = ModelConfig {
    ///     base_url: "https://open.bigmodel.cn//".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     config.completions_endpoint(),
    ///     "https://open.bigmodel.cn/api/paas/v4/chat/completions"
    /// );
    /// ```
    pub fn completions_endpoint(&self) -> String {
        format!(
            "{}/api/paas/v4/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoachError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            CoachError::Configuration(format!("Failed to parse config: {}", e)).into()
        })
    }

    fn apply_env_vars(&mut self) {
        if let Some(api_key) = first_env(&["BIGMODEL_API_KEY", "OPENAI_API_KEY"]) {
            self.model.api_key = Some(api_key);
            tracing::debug!("Env override: model API key");
        }

        if let Some(model) = first_env(&["BIGMODEL_MODEL", "OPENAI_MODEL"]) {
            tracing::debug!(model = %model, "Env override: model name");
            self.model.name = model;
        }

        if let Some(base_url) = first_env(&["BIGMODEL_BASE_URL"]) {
            tracing::debug!(base_url = %base_url, "Env override: BIGMODEL_BASE_URL");
            self.model.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("CRISIS_COACH_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.model.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CRISIS_COACH_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(port) = std::env::var("CRISIS_COACH_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid CRISIS_COACH_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Serve { host, port } = &cli.command {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
        }
    }

    /// Validate the configuration
    ///
    /// A missing API key is deliberately not an error here: the server still
    /// starts and every task endpoint reports the configuration problem.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(CoachError::Configuration("model.name cannot be empty".to_string()).into());
        }

        let base_url = self.model.base_url.trim();
        if base_url.is_empty() {
            return Err(
                CoachError::Configuration("model.base_url cannot be empty".to_string()).into(),
            );
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CoachError::Configuration(format!(
                "model.base_url must start with http:// or https://: {}",
                base_url
            ))
            .into());
        }

        if self.model.timeout_seconds == 0 {
            return Err(CoachError::Configuration(
                "model.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// First non-blank value among the given environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::test_utils::temp_config_file;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "BIGMODEL_API_KEY",
        "OPENAI_API_KEY",
        "BIGMODEL_MODEL",
        "OPENAI_MODEL",
        "BIGMODEL_BASE_URL",
        "CRISIS_COACH_TIMEOUT_SECONDS",
        "CRISIS_COACH_PORT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "GLM-4.7-FlashX");
        assert_eq!(config.model.base_url, "https://open.bigmodel.cn");
        assert!(config.model.api_key.is_none());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_config_validation_success_without_api_key() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_base_url() {
        let mut config = Config::default();
        config.model.base_url = "open.bigmodel.cn".to_string();
        assert!(config.validate().is_err());

        config.model.base_url = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.model.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_model() {
        let mut config = Config::default();
        config.model.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = ModelConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
model:
  api_key: sk-test
  name: glm-4-air
  base_url: http://localhost:9999/
server:
  port: 8088
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.api_key(), Some("sk-test"));
        assert_eq!(config.model.name, "glm-4-air");
        assert_eq!(config.model.timeout_seconds, 120);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(
            config.model.completions_endpoint(),
            "http://localhost:9999/api/paas/v4/chat/completions"
        );
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config.model.name, "GLM-4.7-FlashX");
        assert!(config.model.api_key().is_none());
    }

    #[test]
    #[serial]
    fn test_env_api_key_precedence() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "openai-key");
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config.model.api_key(), Some("openai-key"));

        std::env::set_var("BIGMODEL_API_KEY", "bigmodel-key");
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config.model.api_key(), Some("bigmodel-key"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides_model_and_port() {
        clear_env();
        std::env::set_var("OPENAI_MODEL", "gpt-4o-mini");
        std::env::set_var("BIGMODEL_BASE_URL", "http://127.0.0.1:7000");
        std::env::set_var("CRISIS_COACH_PORT", "not-a-port");
        let config = Config::load("nonexistent.yaml", &Cli::default()).unwrap();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.base_url, "http://127.0.0.1:7000");
        assert_eq!(config.server.port, 3000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_serve_overrides_win() {
        clear_env();
        std::env::set_var("CRISIS_COACH_PORT", "4000");
        let cli = Cli {
            config: None,
            verbose: true,
            json_logs: false,
            command: Commands::Serve {
                host: Some("0.0.0.0".to_string()),
                port: Some(5000),
            },
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let (_dir, path) = temp_config_file("model:\n  name: from-file\n");
        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.model.name, "from-file");
    }

    #[test]
    #[serial]
    fn test_load_invalid_file_is_configuration_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "model: [unclosed").unwrap();
        let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
