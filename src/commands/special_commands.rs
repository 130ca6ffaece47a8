//! Special commands parser for interactive chat mode
//!
//! Special commands manage conversations from inside a chat session instead
//! of being sent to the service:
//! - Start a new conversation
//! - List, open and delete saved conversations
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive. Conversation ids
//! keep their original case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the active conversation and start fresh
    New,

    /// Refresh and print the conversation list
    History,

    /// Make a saved conversation active (full id or unique prefix)
    Open(String),

    /// Delete a saved conversation (full id or unique prefix)
    Delete(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the chat service as a message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an argument it does not take.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use chatline::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/open c1ab").unwrap();
/// assert_eq!(cmd, SpecialCommand::Open("c1ab".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/new" | "/clear" => no_argument(SpecialCommand::New, "/new", arg),
        "/history" | "/list" => no_argument(SpecialCommand::History, "/history", arg),
        "/help" | "/?" => no_argument(SpecialCommand::Help, "/help", arg),
        "exit" | "quit" | "/exit" | "/quit" => no_argument(SpecialCommand::Exit, &command, arg),

        "/open" => required_argument(arg, "/open", "/open <conversation_id>")
            .map(SpecialCommand::Open),
        "/delete" | "/rm" => required_argument(arg, "/delete", "/delete <conversation_id>")
            .map(SpecialCommand::Delete),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn no_argument(
    command: SpecialCommand,
    name: &str,
    arg: &str,
) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnsupportedArgument {
            command: name.to_string(),
            arg: arg.to_string(),
        })
    }
}

fn required_argument(arg: &str, command: &str, usage: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    let mut words = arg.split_whitespace();
    match (words.next(), words.next()) {
        (Some(id), None) => Ok(id.to_string()),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CONVERSATIONS:
  /new            - Start a new conversation
  /history        - List saved conversations
  /open <id>      - Continue a saved conversation (ID or unique prefix)
  /delete <id>    - Delete a saved conversation (ID or unique prefix)

SESSION:
  /help           - Show this help message
  exit, quit      - Exit interactive mode

While a response is streaming, press Ctrl+C to cancel it.
"#
    );
}
