//! Interactive chat application for debugging a Copilot agent.
//!
//! This binary provides a REPL that sends each message, with the conversation
//! so far, to an agent and prints the decoded reply along with diagnostics
//! about every event the agent streamed.
//!
//! # Usage
//!
//! ```bash
//! # Chat with an agent on the default endpoint
//! copilot-debug-chat
//!
//! # Point at another agent and show raw traffic
//! copilot-debug-chat --url http://localhost:3000 --log-level TRACE
//!
//! # Disable colors (useful for piping output)
//! copilot-debug-chat --no-color
//! ```
//!
//! Options not given on the command line are read from the environment
//! variables `URL`, `USERNAME`, `TOKEN` and `LOG_LEVEL`.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/history` - Show the history sent to the agent
//! - `/log-level [level]` - Show or change the log level
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;

use copilot_debug::LogLevel;
use copilot_debug::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command, prompt,
};

/// Main entry point for the copilot-debug-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("copilot-debug-chat [OPTIONS]");
    let config = ChatConfig::from_env(args);
    let use_color = config.use_color;
    let username = config.username.clone();

    let mut renderer = PlainTextRenderer::with_color(use_color);
    warn_unknown_level(&mut renderer, &config.log_level);

    let mut session = ChatSession::new(config)?;
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C cancels whichever turn is in flight.
    let current_turn = Arc::new(Mutex::new(CancellationToken::new()));
    let handler_turn = Arc::clone(&current_turn);
    ctrlc::set_handler(move || {
        if let Ok(token) = handler_turn.lock() {
            token.cancel();
        }
    })?;

    println!("Copilot agent debugger (agent: {})", session.config().url);
    println!("Type /help for commands, /quit to exit");
    println!("\nStart typing to chat with your assistant...");

    loop {
        let readline = rl.readline(&prompt(&username, use_color));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::History => {
                            print_history(&mut renderer, &session);
                        }
                        ChatCommand::LogLevel(Some(level)) => {
                            warn_unknown_level(&mut renderer, &level);
                            renderer.print_info(&format!("Log level set to {level}"));
                            session.set_log_level(level);
                        }
                        ChatCommand::LogLevel(None) => {
                            renderer.print_info(&format!("Log level: {}", session.log_level()));
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                let cancel = CancellationToken::new();
                if let Ok(mut turn) = current_turn.lock() {
                    *turn = cancel.clone();
                }
                match session.send(line, &cancel).await {
                    Ok(replies) => {
                        let level = session.log_level().clone();
                        for reply in &replies {
                            renderer.print_message(reply, &level);
                        }
                    }
                    Err(err) if err.is_abort() => renderer.print_interrupted(),
                    Err(err) => renderer.print_decode_error(&err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn warn_unknown_level(renderer: &mut dyn Renderer, level: &LogLevel) {
    if !level.is_known() {
        renderer.print_error(&format!(
            "log level {level} is not one of `DEBUG`, `TRACE`, or `NONE`; diagnostics will be suppressed"
        ));
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Agent: {}", stats.url);
    println!("      Log level: {}", stats.log_level);
    println!(
        "      Messages: {} ({} user / {} agent)",
        stats.message_count, stats.user_messages, stats.agent_messages
    );
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.failed_requests
    );
}

fn print_history(renderer: &mut dyn Renderer, session: &ChatSession) {
    if session.history().is_empty() {
        renderer.print_info("    (no messages)");
        return;
    }
    match serde_json::to_string_pretty(session.history()) {
        Ok(json) => renderer.print_info(&json),
        Err(err) => renderer.print_error(&format!("Failed to serialize history: {err}")),
    }
}
