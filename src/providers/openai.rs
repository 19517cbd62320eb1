//! OpenAI-compatible provider implementation for SheetQA
//!
//! Talks to a `/chat/completions` endpoint with bearer-token auth. The API
//! key is read from the environment variable named in the configuration
//! when the provider is created.

use crate::config::OpenAiConfig;
use crate::error::{Result, SheetQaError};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat completion provider
///
/// # Examples
///
/// ```no_run
/// use sheetqa::config::OpenAiConfig;
/// use sheetqa::providers::{OpenAiProvider, Provider};
///
/// # async fn example() -> sheetqa::error::Result<()> {
/// let provider = OpenAiProvider::new(OpenAiConfig::default())?;
/// let answer = provider.generate("Sales were 100 in Jan and 150 in Feb. What is the percent increase?").await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    api_key: Option<String>,
}

/// Request body for /chat/completions
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Response body from /chat/completions
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a provider, reading the API key from the configured variable
    ///
    /// A missing or empty variable is not an error here; requests made
    /// without a key fail with `SheetQaError::MissingCredentials`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "No API key found in ${}; completion requests will be refused",
                config.api_key_env
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit API key
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::config::OpenAiConfig;
    /// use sheetqa::providers::{OpenAiProvider, Provider};
    ///
    /// let provider = OpenAiProvider::with_api_key(OpenAiConfig::default(), None).unwrap();
    /// assert!(!provider.has_credentials());
    /// ```
    pub fn with_api_key(config: OpenAiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("sheetqa/0.1.0")
            .build()
            .map_err(|e| SheetQaError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SheetQaError::MissingCredentials("openai".to_string()))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        tracing::debug!(
            "Sending OpenAI request: model={}, {} messages",
            self.config.model,
            messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                SheetQaError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(SheetQaError::Provider(format!(
                "OpenAI returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            SheetQaError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| SheetQaError::Provider("OpenAI response had no choices".to_string()))?;

        Ok(match body.usage {
            Some(usage) => CompletionResponse::with_usage(
                message,
                TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
            ),
            None => CompletionResponse::new(message),
        })
    }
}
