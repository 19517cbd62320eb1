//! Configuration management for SheetQA
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SheetQaError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for SheetQA
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion provider configuration (OpenAI, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Question-answering engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Provider configuration
///
/// Specifies which completion provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI-compatible chat completion configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL for the API (useful for tests and compatible gateways)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Chat model to use
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            temperature: 0.0,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Question-answering engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on a single completion request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of rows shown in the context preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// File extensions accepted for upload (without the dot)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Trend chart settings
    #[serde(default)]
    pub chart: ChartConfig,
}

fn default_timeout() -> u64 {
    30
}

fn default_preview_rows() -> usize {
    crate::context::DEFAULT_PREVIEW_ROWS
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["xlsx".to_string(), "xls".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            preview_rows: default_preview_rows(),
            allowed_extensions: default_allowed_extensions(),
            chart: ChartConfig::default(),
        }
    }
}

/// Trend chart configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Append a chart to answers when a trend exists
    #[serde(default = "default_chart_enabled")]
    pub enabled: bool,

    /// Image width in pixels
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

fn default_chart_enabled() -> bool {
    true
}

fn default_chart_width() -> u32 {
    640
}

fn default_chart_height() -> u32 {
    400
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: default_chart_enabled(),
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning
    /// is logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
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
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SheetQaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SheetQaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("SHEETQA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("SHEETQA_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("SHEETQA_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(host) = std::env::var("SHEETQA_OLLAMA_HOST") {
            self.provider.ollama.host = host;
        }

        if let Ok(model) = std::env::var("SHEETQA_OLLAMA_MODEL") {
            self.provider.ollama.model = model;
        }

        if let Ok(timeout) = std::env::var("SHEETQA_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.engine.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SHEETQA_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(rows) = std::env::var("SHEETQA_PREVIEW_ROWS") {
            if let Ok(value) = rows.parse() {
                self.engine.preview_rows = value;
            } else {
                tracing::warn!("Invalid SHEETQA_PREVIEW_ROWS: {}", rows);
            }
        }

        if let Ok(enabled) = std::env::var("SHEETQA_CHART_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.engine.chart.enabled = true,
                "0" | "false" | "no" => self.engine.chart.enabled = false,
                _ => tracing::warn!("Invalid SHEETQA_CHART_ENABLED: {}", enabled),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(provider) = &cli.provider {
            self.provider.provider_type = provider.clone();
        }
        if cli.no_chart {
            self.engine.chart.enabled = false;
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SheetQaError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.provider_type == "openai" && self.provider.openai.api_key_env.is_empty()
        {
            return Err(
                SheetQaError::Config("openai.api_key_env cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.provider.openai.temperature) {
            return Err(SheetQaError::Config(
                "openai.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.engine.timeout_seconds == 0 {
            return Err(
                SheetQaError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.engine.preview_rows == 0 {
            return Err(
                SheetQaError::Config("preview_rows must be greater than 0".to_string()).into(),
            );
        }

        if self.engine.allowed_extensions.is_empty() {
            return Err(SheetQaError::Config(
                "allowed_extensions must list at least one extension".to_string(),
            )
            .into());
        }

        if self.engine.chart.width < 100 || self.engine.chart.height < 100 {
            return Err(SheetQaError::Config(
                "chart width and height must be at least 100 pixels".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
