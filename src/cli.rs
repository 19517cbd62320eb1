//! Command-line interface definition for SheetQA
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for one-shot questions, sheet listing and
//! interactive follow-up sessions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SheetQA - ask questions about spreadsheets
///
/// Answers are grounded in the uploaded data and may include a trend chart.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the provider from config (openai, ollama)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Override the model used by the provider
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Never append trend charts to answers
    #[arg(long, global = true)]
    pub no_chart: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SheetQA
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Upload a workbook and answer one question
    Ask {
        /// Workbook to read (.xlsx or .xls)
        #[arg(short, long)]
        file: PathBuf,

        /// Question about the data
        #[arg(short, long)]
        question: String,

        /// Re-answer on this sheet instead of the first one
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Workbook to read
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Upload a workbook, then keep asking follow-up questions
    Chat {
        /// Workbook to read (.xlsx or .xls)
        #[arg(short, long)]
        file: PathBuf,

        /// First question about the data
        #[arg(short, long)]
        question: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            provider: None,
            model: None,
            no_chart: false,
            command: Commands::Sheets {
                file: PathBuf::from("book.xlsx"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(!cli.no_chart);
    }

    #[test]
    fn test_parse_ask_with_sheet() {
        let cli = Cli::try_parse_from([
            "sheetqa", "ask", "--file", "q.xlsx", "--question", "Total?", "--sheet", "Q2",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask {
                file,
                question,
                sheet,
            } => {
                assert_eq!(file, PathBuf::from("q.xlsx"));
                assert_eq!(question, "Total?");
                assert_eq!(sheet.as_deref(), Some("Q2"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sheetqa", "chat", "-f", "q.xlsx", "-q", "hi", "--provider", "ollama", "--no-chart",
        ])
        .unwrap();
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(cli.no_chart);
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_parse_requires_question() {
        assert!(Cli::try_parse_from(["sheetqa", "ask", "--file", "q.xlsx"]).is_err());
    }
}
