//! LLM completion client for OpenAI-compatible and Anthropic providers.

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// LLM provider selection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    #[default]
    OpenAI,
    /// Mistral, through its OpenAI-compatible chat API.
    Mistral,
    /// Anthropic (Claude models).
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Mistral => "MISTRAL_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Public API root used when no override is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::Mistral => "https://api.mistral.ai/v1",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Configuration for one LLM client.
#[derive(Debug, Clone, Getters, derive_new::new)]
pub struct LlmConfig {
    /// Provider to call.
    provider: LlmProvider,
    /// API key sent with each request.
    api_key: String,
    /// Model name.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Maximum tokens in the completion.
    max_tokens: u32,
    /// API root, without trailing slash.
    base_url: String,
    /// Per-request HTTP timeout.
    timeout: Duration,
}

/// Source of chat completions.
///
/// The external move chooser talks to this trait so tests can swap the
/// network client for a double.
#[async_trait]
pub trait CompletionClient: Send + Sync + std::fmt::Debug {
    /// Generates a completion from a system prompt and user message.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;

    /// Model name reported in logs.
    fn model(&self) -> &str;
}

/// HTTP client for the configured provider.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

impl LlmClient {
    /// Creates a new LLM client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the HTTP client cannot be built.
    #[instrument(skip(config), fields(provider = %config.provider(), model = %config.model()))]
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        info!("Creating LLM client");
        let http = reqwest::Client::builder()
            .timeout(*config.timeout())
            .build()
            .map_err(|e| LlmError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, LlmError> {
        let provider = self.config.provider();
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, %provider, "API request failed");
            LlmError::new(format!("{} API request failed: {}", provider, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, %provider, "Failed to read response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %body, %provider, "API error");
            return Err(LlmError::new(format!(
                "{} API error {}: {}",
                provider, status, body
            )));
        }

        Ok(body)
    }

    /// Generates a completion through the OpenAI-compatible chat API.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn complete_chat(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Building chat completion request");
        let body = ChatCompletionRequest {
            model: self.config.model(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: *self.config.temperature(),
            max_tokens: *self.config.max_tokens(),
        };

        let request = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url()))
            .bearer_auth(self.config.api_key())
            .json(&body);
        let text = self.send(request).await?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse chat response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::new("No content in chat completion response".to_string()))?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using the Anthropic messages API.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn complete_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Building Anthropic API request");
        let body = AnthropicRequest {
            model: self.config.model(),
            max_tokens: *self.config.max_tokens(),
            temperature: *self.config.temperature(),
            system: system_prompt,
            messages: vec![ChatMessage {
                role: "user",
                content: user_message,
            }],
        };

        let request = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url()))
            .header("x-api-key", self.config.api_key().as_str())
            .header("anthropic-version", "2023-06-01")
            .json(&body);
        let text = self.send(request).await?;

        let parsed: AnthropicResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse Anthropic response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })?;

        let content = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| LlmError::new("No text content in Anthropic response".to_string()))?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    #[instrument(
        skip(self, system_prompt, user_message),
        fields(provider = %self.config.provider(), model = %self.config.model())
    )]
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        match self.config.provider() {
            LlmProvider::OpenAI | LlmProvider::Mistral => {
                self.complete_chat(system_prompt, user_message).await
            }
            LlmProvider::Anthropic => self.complete_anthropic(system_prompt, user_message).await,
        }
    }

    fn model(&self) -> &str {
        self.config.model()
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
