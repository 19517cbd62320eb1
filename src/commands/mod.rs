/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `ask`:    Upload a workbook and answer one question
- `sheets`: List sheet names
- `chat`:   Upload, then answer follow-ups interactively

The CLI plays the transport layer: it owns the session identifier and
runs one engine operation at a time.
*/

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::providers::create_provider_with_override;
use crate::session::SessionStore;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

/// Build an engine from configuration
///
/// # Errors
///
/// Returns error if the provider cannot be created
pub fn build_engine(config: &Config, model_override: Option<&str>) -> Result<Engine> {
    let provider = create_provider_with_override(&config.provider, None, model_override)?;
    Ok(Engine::new(
        Arc::from(provider),
        Arc::new(SessionStore::new()),
        config.engine.clone(),
    ))
}

// One-shot question handler
pub mod ask {
    //! One-shot question handler.

    use super::*;
    use std::path::PathBuf;

    /// Upload `file`, answer `question`, and optionally switch to `sheet`
    ///
    /// # Errors
    ///
    /// Returns error only if the engine cannot be built; answer failures
    /// are printed as answer text.
    pub async fn run_ask(
        config: Config,
        model: Option<String>,
        file: PathBuf,
        question: String,
        sheet: Option<String>,
    ) -> Result<()> {
        let engine = build_engine(&config, model.as_deref())?;
        let session_id = SessionStore::new_session_id();

        let answer = engine
            .upload(&session_id, Some(file.as_path()), Some(question.as_str()))
            .await;

        match sheet {
            Some(sheet) if engine.sessions().get(&session_id).is_some() => {
                println!("{}", engine.change_sheet(&session_id, &sheet).await);
            }
            _ => println!("{}", answer),
        }
        Ok(())
    }
}

// Sheet listing handler
pub mod sheets {
    //! Sheet listing handler.

    use super::*;
    use crate::dataset;
    use crate::error::SheetQaError;
    use std::path::Path;

    /// Print the sheet names of a workbook, one per line
    ///
    /// # Errors
    ///
    /// Returns error if the extension is not allowed or the workbook
    /// cannot be read
    pub fn list_sheets(config: &Config, file: &Path) -> Result<()> {
        if !dataset::is_allowed_extension(file, &config.engine.allowed_extensions) {
            return Err(SheetQaError::UnsupportedFile(file.display().to_string()).into());
        }
        for name in dataset::sheet_names(file)? {
            println!("{}", name);
        }
        Ok(())
    }
}

// Interactive chat handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Uploads the workbook with the first question, then runs a
    //! readline loop where each line is a follow-up or a `/` command.

    use super::special_commands::{parse_chat_input, print_help, ChatInput};
    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::path::PathBuf;

    /// Start interactive chat
    ///
    /// # Errors
    ///
    /// Returns error if the engine or the line editor cannot be created
    pub async fn run_chat(
        config: Config,
        model: Option<String>,
        file: PathBuf,
        question: String,
    ) -> Result<()> {
        let engine = build_engine(&config, model.as_deref())?;
        let session_id = SessionStore::new_session_id();

        println!("{} {}", "Q:".cyan().bold(), question);
        let answer = engine
            .upload(&session_id, Some(file.as_path()), Some(question.as_str()))
            .await;
        println!("{} {}\n", "A:".green().bold(), answer);

        let Some(session) = engine.sessions().get(&session_id) else {
            return Ok(());
        };
        println!(
            "Active sheet: {} (of {}). Type /help for commands.\n",
            session.selected_sheet().yellow(),
            session.sheet_names().len()
        );

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("sheetqa> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());

                    match parse_chat_input(&line) {
                        Ok(ChatInput::Question(q)) => {
                            let answer = engine.follow_up(&session_id, Some(q.as_str())).await;
                            println!("{} {}\n", "A:".green().bold(), answer);
                        }
                        Ok(ChatInput::SwitchSheet(sheet)) => {
                            let answer = engine.change_sheet(&session_id, &sheet).await;
                            println!("{} {}\n", "A:".green().bold(), answer);
                        }
                        Ok(ChatInput::ListSheets) => print_sheets(&engine, &session_id),
                        Ok(ChatInput::History) => print_history(&engine, &session_id),
                        Ok(ChatInput::Help) => print_help(),
                        Ok(ChatInput::Exit) => break,
                        Err(e) => eprintln!("{}\n", e.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        engine.sessions().remove(&session_id);
        println!("Goodbye!");
        Ok(())
    }

    fn print_sheets(engine: &Engine, session_id: &str) {
        let Some(session) = engine.sessions().get(session_id) else {
            return;
        };
        for name in session.sheet_names() {
            if name == session.selected_sheet() {
                println!("* {}", name.yellow());
            } else {
                println!("  {}", name);
            }
        }
        println!();
    }

    fn print_history(engine: &Engine, session_id: &str) {
        let Some(session) = engine.sessions().get(session_id) else {
            return;
        };
        for (i, entry) in session.history().iter().enumerate() {
            println!("{} {}", format!("{}. Q:", i + 1).cyan().bold(), entry.question);
            println!("   {} {}", "A:".green().bold(), entry.answer);
        }
        println!();
    }
}
