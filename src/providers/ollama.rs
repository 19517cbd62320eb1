//! Ollama provider implementation for SheetQA
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server's `/api/chat` endpoint. Ollama needs no
//! credentials.

use crate::config::OllamaConfig;
use crate::error::{Result, SheetQaError};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use sheetqa::config::OllamaConfig;
/// use sheetqa::providers::{OllamaProvider, Provider};
///
/// # async fn example() -> sheetqa::error::Result<()> {
/// let config = OllamaConfig {
///     host: "http://localhost:11434".to_string(),
///     model: "llama3.2:latest".to_string(),
/// };
/// let provider = OllamaProvider::new(config)?;
/// let text = provider.generate("Hello!").await?;
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Message structure in Ollama responses
#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::config::OllamaConfig;
    /// use sheetqa::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("sheetqa/0.1.0")
            .build()
            .map_err(|e| SheetQaError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let request = OllamaRequest {
            model: &self.config.model,
            messages,
            stream: false,
        };

        tracing::debug!("Sending Ollama request: {} messages", messages.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                SheetQaError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(SheetQaError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            SheetQaError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: role={}, done={}, prompt_tokens={}, completion_tokens={}",
            ollama_response.message.role,
            ollama_response.done,
            ollama_response.prompt_eval_count,
            ollama_response.eval_count
        );

        let message = Message::assistant(ollama_response.message.content);
        let response = if ollama_response.prompt_eval_count > 0 || ollama_response.eval_count > 0 {
            CompletionResponse::with_usage(
                message,
                TokenUsage::new(
                    ollama_response.prompt_eval_count,
                    ollama_response.eval_count,
                ),
            )
        } else {
            CompletionResponse::new(message)
        };

        Ok(response)
    }
}
