//! Error types for SheetQA
//!
//! This module defines the error types used throughout the engine,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SheetQA operations
///
/// Covers configuration loading, spreadsheet parsing, completion provider
/// interactions and chart rendering. None of these escape the public
/// engine operations: the engine converts them to user-facing answer text.
#[derive(Error, Debug)]
pub enum SheetQaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, bad responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// The completion request did not finish within the configured bound
    #[error("Provider request timed out after {seconds}s")]
    ProviderTimeout {
        /// The configured timeout in seconds
        seconds: u64,
    },

    /// Spreadsheet could not be opened or parsed
    #[error("File load error: {0}")]
    Load(String),

    /// Requested sheet does not exist in the workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// File extension is not on the allow-list
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    /// Parsed sheet had no data rows or no columns
    #[error("Sheet is empty: {0}")]
    EmptySheet(String),

    /// Chart rendering errors
    #[error("Chart error: {0}")]
    Chart(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for SheetQA operations
///
/// Uses `anyhow::Error` so context can be attached while the typed
/// `SheetQaError` stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
