//! Chat application module for interactive agent debugging.
//!
//! This module provides a REPL that sends each operator message, together
//! with the conversation so far, to an agent and prints the decoded reply.
//! It supports:
//!
//! - Verbosity-aware display of messages, confirmations, references and errors
//! - Batched decode diagnostics when the agent misbehaves
//! - Slash commands for session control
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation history and agent interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer, TerminalLogger, prompt};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_URL, DEFAULT_USERNAME};
pub use session::{ChatBackend, ChatSession, SessionStats};
