//! Text-completion client abstraction for OpenAI and Anthropic.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client as OpenAIClient,
};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Completion provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for the completion client.
///
/// Move requests expect a single small integer back, so the defaults bias
/// hard toward short, deterministic output: temperature 0.3 and a 10-token
/// response cap.
#[derive(Debug, Clone, Getters)]
pub struct LlmConfig {
    provider: LlmProvider,
    #[getter(skip)]
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

/// Default response cap: the reply should be one integer, nothing more.
const DEFAULT_MAX_TOKENS: u32 = 10;

/// Default sampling temperature: low, for strategic rather than creative play.
const DEFAULT_TEMPERATURE: f32 = 0.3;

impl LlmConfig {
    /// Creates a new completion configuration.
    #[instrument(skip(api_key), fields(provider = ?provider))]
    pub fn new(provider: LlmProvider, api_key: String, max_tokens: u32, temperature: f32) -> Self {
        debug!("Creating completion config");
        Self {
            provider,
            api_key,
            max_tokens,
            temperature,
        }
    }

    /// Creates a configuration for the given provider, reading the API key
    /// from the environment (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`).
    ///
    /// The key is held in memory only and never logged.
    #[instrument]
    pub fn from_env(provider: LlmProvider) -> Result<Self, CompletionError> {
        let api_key = match provider {
            LlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                CompletionError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            LlmProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
                CompletionError::new("ANTHROPIC_API_KEY environment variable not set".to_string())
            })?,
        };

        Ok(Self::new(
            provider,
            api_key,
            DEFAULT_MAX_TOKENS,
            DEFAULT_TEMPERATURE,
        ))
    }
}

/// A text-completion backend.
///
/// The move service depends on this seam rather than a concrete client so
/// tests can script replies without network access.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    /// Generates a completion for the given system prompt and user message
    /// using the named model.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
    ) -> Result<String, CompletionError>;
}

/// Completion client that abstracts over multiple providers.
///
/// The model identifier travels with each request (it is selected per
/// player), so only the provider, credential, and sampling settings live
/// in the config.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
}

impl LlmClient {
    /// Creates a new completion client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating completion client");
        Self { config }
    }

    /// Generates a completion using OpenAI.
    #[instrument(skip(self, system_prompt, user_message), fields(model = %model))]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        debug!("Creating OpenAI client");

        let client = OpenAIClient::with_config(
            OpenAIConfig::new().with_api_key(self.config.api_key.clone()),
        );

        debug!("Building chat completion request");
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build system message");
                        CompletionError::new(format!("Failed to build system message: {}", e))
                    })?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_message)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build user message");
                        CompletionError::new(format!("Failed to build user message: {}", e))
                    })?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build request");
                CompletionError::new(format!("Failed to build request: {}", e))
            })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            CompletionError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                CompletionError::new("No content in OpenAI response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, system_prompt, user_message), fields(model = %model))]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        let client = reqwest::Client::new();

        debug!("Building Anthropic API request");
        let request_body = serde_json::json!({
            "model": model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        debug!("Sending request to Anthropic");
        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                CompletionError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            CompletionError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(CompletionError::new(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, "Failed to parse Anthropic response");
                CompletionError::new(format!("Failed to parse response: {}", e))
            })?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!("No text content in Anthropic response");
                CompletionError::new("No text content in Anthropic response".to_string())
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

#[async_trait::async_trait]
impl Completion for LlmClient {
    #[instrument(skip(self, system_prompt, user_message), fields(provider = ?self.config.provider, model = %model))]
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        debug!("Generating completion");
        match self.config.provider {
            LlmProvider::OpenAI => {
                self.generate_openai(system_prompt, user_message, model).await
            }
            LlmProvider::Anthropic => {
                self.generate_anthropic(system_prompt, user_message, model)
                    .await
            }
        }
    }
}

/// Completion client error.
#[derive(Debug, Clone, Display, Error)]
#[display("completion error: {} at {}:{}", message, file, line)]
pub struct CompletionError {
    /// Error message.
    pub message: String,
    /// Line number where the error was created.
    pub line: u32,
    /// Source file where the error was created.
    pub file: &'static str,
}

impl CompletionError {
    /// Creates a new completion error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Completion error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
