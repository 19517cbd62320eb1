//! Special commands parser for interactive chat
//!
//! Lines starting with `/` are commands (case-insensitive); anything else
//! is a follow-up question about the active sheet.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument {
        /// Command that was entered
        command: String,
        /// Usage hint
        usage: String,
    },
}

/// One line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Switch to another sheet and re-answer the original question
    SwitchSheet(String),
    /// List the workbook's sheets
    ListSheets,
    /// Print the question/answer history
    History,
    /// Print help
    Help,
    /// Leave the chat
    Exit,
    /// A follow-up question
    Question(String),
}

/// Parse one line of chat input
///
/// # Errors
///
/// Returns `CommandError` for unknown commands or missing arguments
///
/// # Examples
///
/// ```
/// use sheetqa::commands::special_commands::{parse_chat_input, ChatInput};
///
/// assert_eq!(parse_chat_input("/SHEET Q2 Totals").unwrap(), ChatInput::SwitchSheet("Q2 Totals".into()));
/// assert_eq!(parse_chat_input("What about 2024?").unwrap(), ChatInput::Question("What about 2024?".into()));
/// ```
pub fn parse_chat_input(line: &str) -> Result<ChatInput, CommandError> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return Ok(ChatInput::Question(trimmed.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name.to_lowercase().as_str() {
        "sheet" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/sheet".to_string(),
            usage: "/sheet <name>".to_string(),
        }),
        "sheet" => Ok(ChatInput::SwitchSheet(arg.to_string())),
        "sheets" => Ok(ChatInput::ListSheets),
        "history" => Ok(ChatInput::History),
        "help" | "?" => Ok(ChatInput::Help),
        "exit" | "quit" => Ok(ChatInput::Exit),
        _ => Err(CommandError::UnknownCommand(format!("/{}", name))),
    }
}

/// Print the list of chat commands
pub fn print_help() {
    println!(
        r#"
Commands:
  /sheet <name>   Switch sheet and re-answer your original question
  /sheets         List the sheets in the workbook
  /history        Show questions and answers for this session
  /help           Show this help
  /exit           Leave the chat

Anything else is asked as a follow-up about the current sheet.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_question() {
        assert_eq!(
            parse_chat_input("  total revenue?  ").unwrap(),
            ChatInput::Question("total revenue?".into())
        );
    }

    #[test]
    fn test_commands_case_insensitive() {
        assert_eq!(parse_chat_input("/Sheets").unwrap(), ChatInput::ListSheets);
        assert_eq!(parse_chat_input("/HISTORY").unwrap(), ChatInput::History);
        assert_eq!(parse_chat_input("/quit").unwrap(), ChatInput::Exit);
        assert_eq!(parse_chat_input("/?").unwrap(), ChatInput::Help);
    }

    #[test]
    fn test_sheet_keeps_name_case_and_spaces() {
        assert_eq!(
            parse_chat_input("/sheet  Q3 Forecast ").unwrap(),
            ChatInput::SwitchSheet("Q3 Forecast".into())
        );
    }

    #[test]
    fn test_sheet_requires_name() {
        assert!(matches!(
            parse_chat_input("/sheet"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_chat_input("/mode write").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/mode".into()));
        assert!(err.to_string().contains("/help"));
    }
}
