//! Output rendering for the operator.
//!
//! This module turns decoded messages and decode failures into the text the
//! operator reads.  Formatting lives in free functions so it can be tested
//! without a terminal; the [`Renderer`] trait decides where the text goes.

use std::io::{self, Stdout, Write};

use crate::client_logger::ClientLogger;
use crate::decoder::{CONFIRMATION_EVENT, ERRORS_EVENT, Payload, REFERENCES_EVENT};
use crate::sse::EventRecord;
use crate::{Error, LogLevel, Message};

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for roles and prompts).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for raw traffic).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for diagnostics).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for magenta text (used for the operator name).
const ANSI_MAGENTA: &str = "\x1b[35m";

const CONDENSED_CONTENT: usize = 50;
const CONDENSED_DATA: usize = 20;

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{color}{text}{ANSI_RESET}")
    } else {
        text.to_string()
    }
}

fn condensed(text: &str, limit: usize) -> String {
    let prefix: String = text.chars().take(limit).collect();
    format!("[condensed] {prefix}")
}

/// A titled table of rows shown under `DEBUG`.
struct DetailBlock {
    header: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    footer: &'static str,
}

impl DetailBlock {
    fn new(header: Vec<&'static str>, footer: &'static str) -> Self {
        Self {
            header,
            rows: Vec::new(),
            footer,
        }
    }

    fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1) + 4;
        let rule = format!("+{}+\n", "-".repeat(total.saturating_sub(2)));

        let mut out = rule.clone();
        out.push_str(&table_line(self.header.iter().copied(), &widths));
        out.push_str(&rule);
        for row in &self.rows {
            out.push_str(&table_line(row.iter().map(String::as_str), &widths));
        }
        out.push_str(&rule);
        out.push_str(&format!("{:>width$}\n", self.footer, width = total));
        out
    }
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect();
    format!("| {} |\n", padded.join(" | "))
}

/// Format one decoded message the way the operator sees it.
///
/// `DEBUG` diagnostics add a confirmation line and a detail table for every
/// part of the message that was received.
pub fn format_message(message: &Message, level: &LogLevel, use_color: bool) -> String {
    let debug = level.is_debug();
    let green = |text: &str| paint(text, ANSI_GREEN, use_color);
    let cyan = |text: &str| paint(text, ANSI_CYAN, use_color);
    let mut out = String::new();

    if let Some(function_call) = &message.function_call {
        if debug {
            out.push_str(&green("\nHuzzah! You successfully received a function call!\n"));
            let block = DetailBlock::new(vec!["Key", "Value"], "Parsed function data")
                .row(vec!["role".to_string(), message.role.clone()])
                .row(vec!["name".to_string(), function_call.name.clone()])
                .row(vec!["arguments".to_string(), function_call.arguments.clone()]);
            out.push_str(&green(&block.render()));
        }
    } else if !message.role.is_empty() && !message.content.is_empty() {
        out.push_str(&format!("{}: {}\n", cyan(&message.role), message.content));
        if debug {
            out.push_str(&format!(
                "\n{}\n",
                green("Huzzah! You successfully received a message!")
            ));
            let block = DetailBlock::new(vec!["Role", "Content"], "Parsed message data").row(vec![
                message.role.clone(),
                condensed(&message.content, CONDENSED_CONTENT),
            ]);
            out.push_str(&green(&block.render()));
        }
    }

    if let Some(confirmation) = &message.confirmation {
        if debug {
            out.push_str(&green("\nHuzzah! You successfully received a confirmation!\n"));
            let opaque = confirmation
                .confirmation
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_default();
            let block = DetailBlock::new(vec!["Key", "Value"], "Parsed confirmation data")
                .row(vec!["type".to_string(), confirmation.r#type.clone()])
                .row(vec!["title".to_string(), confirmation.title.clone()])
                .row(vec!["message".to_string(), confirmation.message.clone()])
                .row(vec!["confirmation".to_string(), opaque]);
            out.push_str(&green(&block.render()));
        }
        out.push_str(&cyan(&format!(
            "\n{}\n  {}\nReply: [y/N]\n",
            confirmation.title, confirmation.message
        )));
    }

    if !message.references.is_empty() {
        if debug {
            out.push_str(&green("\nHuzzah! You successfully received some references!\n"));
            let mut block = DetailBlock::new(
                vec![
                    "index",
                    "id",
                    "type",
                    "data",
                    "display_icon",
                    "display_name",
                    "display_url",
                ],
                "Parsed references data",
            );
            for (i, reference) in message.references.iter().enumerate() {
                let data = reference
                    .data
                    .as_ref()
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                block = block.row(vec![
                    i.to_string(),
                    reference.id.clone(),
                    reference.r#type.clone(),
                    condensed(&data, CONDENSED_DATA),
                    reference.metadata.display_icon.clone(),
                    reference.metadata.display_name.clone(),
                    reference.metadata.display_url.clone(),
                ]);
            }
            out.push_str(&green(&block.render()));
        }
        for (i, reference) in message.references.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}: {}\n",
                i + 1,
                reference.id,
                reference.metadata.display_name
            ));
        }
    }

    if !message.errors.is_empty() {
        if debug {
            out.push_str(&green("\nHuzzah! You successfully received some errors!\n"));
            let mut block = DetailBlock::new(
                vec!["index", "message", "type", "code", "identifier"],
                "Parsed error data",
            );
            for (i, error) in message.errors.iter().enumerate() {
                block = block.row(vec![
                    i.to_string(),
                    error.message.clone(),
                    error.r#type.clone(),
                    error.code.clone(),
                    error.identifier.clone(),
                ]);
            }
            out.push_str(&green(&block.render()));
        }
        for (i, error) in message.errors.iter().enumerate() {
            out.push_str(&format!("{}. {} error: {}\n", i + 1, error.r#type, error.message));
        }
    }

    out
}

/// The operator prompt shown before each line of input.
pub fn prompt(username: &str, use_color: bool) -> String {
    format!("{}: ", paint(username, ANSI_MAGENTA, use_color))
}

/// What a rejected record was supposed to be, for the decode error banner.
fn decode_error_subject(error: &Error) -> &'static str {
    match error {
        Error::SchemaValidation { event, .. } if event == CONFIRMATION_EVENT => {
            "copilot confirmation"
        }
        Error::SchemaValidation { event, .. } if event == REFERENCES_EVENT => "copilot reference",
        Error::SchemaValidation { event, .. } if event == ERRORS_EVENT => "copilot error",
        _ => "event",
    }
}

/// Format a failed decode session.
///
/// Errors that carry the offending data fields show them above the defects.
pub fn format_decode_error(error: &Error, use_color: bool) -> String {
    let text = match error.data() {
        Some(data) => format!(
            "\nAlas...The following is not a valid {}:\n{}\n\nErrors:\n{}\n\n",
            decode_error_subject(error),
            data.join("\n"),
            error.message()
        ),
        None => format!("\n{error}\n"),
    };
    paint(&text, ANSI_RED, use_color)
}

/// Trait for rendering a chat session.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print one decoded message.
    fn print_message(&mut self, message: &Message, level: &LogLevel);

    /// Print a failed turn, including the offending data when known.
    fn print_decode_error(&mut self, error: &Error);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a turn is interrupted by the user.
    fn print_interrupted(&mut self) {}
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Returns true if ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message, level: &LogLevel) {
        print!("{}", format_message(message, level, self.use_color));
        self.flush();
    }

    fn print_decode_error(&mut self, error: &Error) {
        eprint!("{}", format_decode_error(error, self.use_color));
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("{}", paint(&format!("Error: {error}"), ANSI_RED, self.use_color));
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_interrupted(&mut self) {
        println!("\n[interrupted]");
        self.flush();
    }
}

/// Writes raw wire traffic to stderr.
///
/// Installed on the agent client so that `TRACE` sessions show the response
/// head and every record exactly as received.
#[derive(Debug, Clone, Copy)]
pub struct TerminalLogger {
    use_color: bool,
}

impl TerminalLogger {
    /// Creates a logger with the given color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    fn emit(&self, text: &str) {
        eprintln!("{}", paint(text, ANSI_YELLOW, self.use_color));
    }
}

impl ClientLogger for TerminalLogger {
    fn log_response(&self, status: u16, headers: &[(String, String)]) {
        let mut text = format!("Raw Response\nHTTP {status}\n");
        for (name, value) in headers {
            text.push_str(&format!("{name}: {value}\n"));
        }
        self.emit(&text);
    }

    fn log_record(&self, record: &EventRecord) {
        let mut text = String::new();
        for field in record.fields() {
            text.push_str(&format!("{}: {}\n", field.name, field.value));
        }
        self.emit(&text);
    }

    fn log_payload(&self, payload: &Payload) {
        match serde_json::to_string(payload) {
            Ok(json) => self.emit(&format!("payload {json}")),
            Err(e) => self.emit(&format!("payload <unserializable: {e}>")),
        }
    }

    fn log_messages(&self, messages: &[Message]) {
        self.emit(&format!("decoded {} message(s)", messages.len()));
    }
}
