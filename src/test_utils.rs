//! Test utilities for SheetQA
//!
//! Temporary directory helpers, small datasets and a recording mock
//! provider shared by the unit tests.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::dataset::{Column, Dataset, Value};
use crate::error::{Result, SheetQaError};
use crate::providers::{CompletionResponse, Message, Provider};

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Two-row `Year` / `Revenue` dataset (2023: 100, 2024: 150)
pub fn revenue_by_year() -> Dataset {
    Dataset::new(
        "Sheet1",
        vec![
            Column::new("Year", vec![Value::Int(2023), Value::Int(2024)]),
            Column::new("Revenue", vec![Value::Int(100), Value::Int(150)]),
        ],
    )
    .expect("valid dataset")
}

/// Mock provider that records every prompt it receives
pub struct RecordingProvider {
    reply: String,
    credentials: bool,
    delay: Option<Duration>,
    failure: Mutex<Option<SheetQaError>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    /// Provider that always answers with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            credentials: true,
            delay: None,
            failure: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Provider that reports no credentials
    pub fn without_credentials() -> Self {
        Self {
            credentials: false,
            ..Self::replying("")
        }
    }

    /// Provider whose first call fails with `error`
    pub fn failing(error: SheetQaError) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            ..Self::replying("")
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error.into());
        }
        Ok(CompletionResponse::new(Message::assistant(self.reply.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_recording_provider_records_prompts() {
        let provider = RecordingProvider::replying("ok");
        assert_eq!(provider.generate("first").await.unwrap(), "ok");
        assert_eq!(provider.prompts(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_failing_provider_fails_once() {
        let provider = RecordingProvider::failing(SheetQaError::Provider("down".into()));
        assert!(provider.generate("a").await.is_err());
        assert!(provider.generate("b").await.is_ok());
    }
}
