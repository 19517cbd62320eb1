//! Base provider trait and common types for SheetQA
//!
//! This module defines the Provider trait that all completion providers
//! implement, the message and response types they exchange, and the typed
//! failure kinds a completion request can end in.

use crate::error::{Result, SheetQaError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::providers::Message;
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Token usage information from a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// The assistant's reply
    pub message: Message,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Response without usage information
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Response with usage information
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }
}

/// Provider trait for completion services
///
/// The engine treats a provider as an opaque, fallible text-completion
/// capability. Implementations must not retry on their own.
///
/// # Examples
///
/// ```
/// use sheetqa::providers::{CompletionResponse, Message, Provider};
/// use sheetqa::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
///         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(CompletionResponse::new(Message::assistant(last)))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &str;

    /// Whether the provider has the credentials it needs to make a call
    ///
    /// Providers that need no credentials keep the default.
    fn has_credentials(&self) -> bool {
        true
    }

    /// Completes a conversation with the given messages
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse>;

    /// Generate text for a single prompt
    ///
    /// Sends the prompt as one user message and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying completion fails
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.complete(&[Message::user(prompt)]).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                "{} usage: prompt={}, completion={}, total={}",
                self.name(),
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }
        Ok(response.message.content)
    }
}

/// How a completion request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionFailure {
    /// No credential is configured for the provider; no call was made
    MissingCredentials,
    /// The request exceeded its time bound
    Timeout,
    /// Any other failure
    Other(String),
}

/// Answer text when the provider has no credential
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "Error: The AI service is not configured. Please set the API key and try again.";

/// Answer text when the provider timed out
pub const TIMEOUT_MESSAGE: &str =
    "Error: The AI service is unavailable due to a timeout. Please try again later.";

/// Answer text for every other provider failure
pub const UNAVAILABLE_MESSAGE: &str =
    "Error: The AI service is currently unavailable. Please try again later.";

impl CompletionFailure {
    /// Classify a provider error by walking its cause chain
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::error::SheetQaError;
    /// use sheetqa::providers::CompletionFailure;
    ///
    /// let err = anyhow::Error::from(SheetQaError::ProviderTimeout { seconds: 5 });
    /// assert_eq!(CompletionFailure::classify(&err), CompletionFailure::Timeout);
    /// ```
    pub fn classify(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<SheetQaError>() {
                match e {
                    SheetQaError::MissingCredentials(_) => return Self::MissingCredentials,
                    SheetQaError::ProviderTimeout { .. } => return Self::Timeout,
                    SheetQaError::Http(re) if re.is_timeout() => return Self::Timeout,
                    _ => {}
                }
            }
            if let Some(re) = cause.downcast_ref::<reqwest::Error>() {
                if re.is_timeout() {
                    return Self::Timeout;
                }
            }
        }
        Self::Other(error.to_string())
    }

    /// Fixed user-facing text for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => MISSING_CREDENTIALS_MESSAGE,
            Self::Timeout => TIMEOUT_MESSAGE,
            Self::Other(_) => UNAVAILABLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        reply: String,
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, "user");
            Ok(CompletionResponse::with_usage(
                Message::assistant(self.reply.clone()),
                TokenUsage::new(3, 4),
            ))
        }
    }

    #[tokio::test]
    async fn test_generate_returns_reply_text() {
        let provider = StaticProvider {
            reply: "42".to_string(),
        };
        assert!(provider.has_credentials());
        assert_eq!(provider.generate("what?").await.unwrap(), "42");
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, "system");
        assert_eq!(Message::assistant("a").content, "a");
    }

    #[test]
    fn test_classify_missing_credentials() {
        let err = anyhow::Error::from(SheetQaError::MissingCredentials("openai".into()));
        assert_eq!(
            CompletionFailure::classify(&err),
            CompletionFailure::MissingCredentials
        );
    }

    #[test]
    fn test_classify_wrapped_timeout() {
        let err = anyhow::Error::from(SheetQaError::ProviderTimeout { seconds: 1 })
            .context("calling provider");
        assert_eq!(CompletionFailure::classify(&err), CompletionFailure::Timeout);
    }

    #[test]
    fn test_classify_other() {
        let err = anyhow::Error::from(SheetQaError::Provider("500".into()));
        let failure = CompletionFailure::classify(&err);
        assert!(matches!(failure, CompletionFailure::Other(_)));
        assert_eq!(failure.user_message(), UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_messages_are_distinct() {
        assert_ne!(MISSING_CREDENTIALS_MESSAGE, TIMEOUT_MESSAGE);
        assert_ne!(TIMEOUT_MESSAGE, UNAVAILABLE_MESSAGE);
    }
}
