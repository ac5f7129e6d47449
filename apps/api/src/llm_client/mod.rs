//! LLM Client: the single point of entry for every text generation call in Chalk.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! All generation goes through the `TextGenerator` trait, which `LlmClient`
//! implements against the Anthropic Messages API.
//!
//! Contract: one attempt per call, no retry, no streaming. The HTTP client
//! carries a bounded timeout so a stalled provider surfaces as `LlmError::Timeout`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::prompt::{ChatMessage, Role};

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default model for all generation calls. Overridable through `LLM_MODEL`.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Prompt has no user message")]
    NoUserMessage,
}

/// Text produced by one generation call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The generation seam. `AppState` carries an `Arc<dyn TextGenerator>` so the
/// provider can be swapped (or scripted in tests) without touching callers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `messages` to the provider and returns non-empty text.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Generation, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize, PartialEq)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Shared provider client, constructed once at startup and injected via `AppState`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            config.anthropic_api_key.clone(),
            config.llm_api_url.clone(),
            config.llm_model.clone(),
            config.llm_max_tokens,
            config.llm_timeout,
        )
    }

    pub fn with_base_url(
        api_key: String,
        api_url: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            api_url,
            model,
            max_tokens,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single raw call to the provider, returning the full response object.
    pub async fn call(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let (system, turns) = split_messages(messages);
        if turns.is_empty() {
            return Err(LlmError::NoUserMessage);
        }

        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature,
            system,
            messages: turns,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Prefer the provider's own error message when it parses
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await.map_err(|e| self.classify(e))?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    fn classify(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(error)
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Generation, LlmError> {
        let response = self.call(messages, temperature).await?;
        let text = response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)?;

        Ok(Generation {
            text: text.to_string(),
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}

/// Splits role-tagged messages into the provider's shape: system messages are
/// joined into the top-level `system` field and consecutive turns with the
/// same role are merged, since the Messages API expects alternating turns.
fn split_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<AnthropicMessage>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let mut turns: Vec<AnthropicMessage> = Vec::new();
    for message in messages.iter().filter(|m| m.role != Role::System) {
        let role = match message.role {
            Role::Assistant => "assistant",
            _ => "user",
        };
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => turns.push(AnthropicMessage {
                role,
                content: message.content.clone(),
            }),
        }
    }

    let system = (!system.is_empty()).then(|| system.join("\n"));
    (system, turns)
}
