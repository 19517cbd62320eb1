//! SheetQA - spreadsheet question-answering library
//!
//! Turns a parsed spreadsheet plus a free-text question into an answer:
//! a deterministic one when a heuristic applies, otherwise a completion
//! grounded in a summary of the data, optionally with a trend chart.
//!
//! # Architecture
//!
//! - `dataset`: typed tabular data and workbook loading
//! - `classifier`: temporal and numeric column detection
//! - `heuristics`: answers that need no completion request
//! - `context`: grounding summary and trend finding
//! - `prompts`: prompt construction
//! - `providers`: completion provider abstraction (OpenAI, Ollama)
//! - `chart`: trend chart rendering
//! - `session`: per-session state and store
//! - `engine`: answer orchestration and the session protocol
//! - `config`, `error`, `cli`, `commands`: ambient plumbing
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use sheetqa::{Config, Engine, SessionStore};
//! use sheetqa::providers::create_provider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let provider = create_provider(&config.provider)?;
//!     let engine = Engine::new(Arc::from(provider), Arc::new(SessionStore::new()), config.engine);
//!
//!     let answer = engine
//!         .upload("session-1", Some(Path::new("sales.xlsx")), Some("How did revenue change?"))
//!         .await;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod prompts;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Column, ColumnType, Dataset, Value};
pub use engine::Engine;
pub use error::{Result, SheetQaError};
pub use session::{QaEntry, Session, SessionStore};

#[cfg(test)]
pub mod test_utils;
