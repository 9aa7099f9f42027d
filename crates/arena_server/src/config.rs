//! Service configuration.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Configuration for the arena service.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,
    /// Port to bind.
    port: u16,
    /// Directory for CSV event logs.
    log_dir: PathBuf,
    /// Whether the service writes event logs at all.
    enable_logging: bool,
    /// Language-model settings.
    llm: LlmSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_dir: PathBuf::from("logs"),
            enable_logging: true,
            llm: LlmSettings::default(),
        }
    }
}

/// Language-model call settings shared by every external chooser.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Budget for one move request, in seconds.
    timeout_secs: u64,
    /// Maximum completion tokens.
    max_tokens: u32,
    /// Override for the OpenAI API root.
    openai_base_url: Option<String>,
    /// Override for the Mistral API root.
    mistral_base_url: Option<String>,
    /// Override for the Anthropic API root.
    anthropic_base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_tokens: 256,
            openai_base_url: None,
            mistral_base_url: None,
            anthropic_base_url: None,
        }
    }
}

impl LlmSettings {
    /// Move request budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API root for a provider, honoring overrides.
    pub fn base_url(&self, provider: LlmProvider) -> String {
        let configured = match provider {
            LlmProvider::OpenAI => self.openai_base_url.as_deref(),
            LlmProvider::Mistral => self.mistral_base_url.as_deref(),
            LlmProvider::Anthropic => self.anthropic_base_url.as_deref(),
        };
        configured
            .unwrap_or(provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Sets the move request budget.
    pub fn set_timeout_secs(&mut self, secs: u64) {
        self.timeout_secs = secs;
    }

    /// Builds a client configuration for one player.
    ///
    /// The API key is read from the provider's environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is unset or empty.
    #[instrument(skip(self, model), fields(model = %model.as_ref()))]
    pub fn client_config(
        &self,
        provider: LlmProvider,
        model: impl AsRef<str>,
        temperature: f32,
    ) -> Result<LlmConfig, ConfigError> {
        let var = provider.api_key_var();
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::new(format!("{} environment variable not set", var)))?;

        debug!("Creating LLM config");
        Ok(LlmConfig::new(
            provider,
            api_key,
            model.as_ref().to_string(),
            temperature,
            self.max_tokens,
            self.base_url(provider),
            self.timeout(),
        ))
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads a config file if it exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Overrides the bind interface.
    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// Overrides the bind port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Overrides the log directory.
    pub fn set_log_dir(&mut self, log_dir: impl Into<PathBuf>) {
        self.log_dir = log_dir.into();
    }

    /// Turns event logging on or off.
    pub fn set_enable_logging(&mut self, enabled: bool) {
        self.enable_logging = enabled;
    }

    /// Mutable access to language-model settings.
    pub fn llm_mut(&mut self) -> &mut LlmSettings {
        &mut self.llm
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
