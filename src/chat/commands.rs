//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the agent.

use crate::LogLevel;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Show the conversation history as sent to the agent.
    History,

    /// Change the log level, or show it when `None`.
    LogLevel(Option<LogLevel>),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use copilot_debug::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/log-level trace").is_some());
/// assert!(parse_command("Hello, agent!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "history" => ChatCommand::History,
        "log-level" | "log_level" => ChatCommand::LogLevel(argument.map(LogLevel::from)),
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };
    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /history               Show the history sent to the agent
  /log-level [level]     Show or set the log level (DEBUG, TRACE, NONE)
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
