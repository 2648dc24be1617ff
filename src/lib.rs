// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod decoder;
pub mod error;
pub mod log_level;
pub mod message_buffer;
pub mod observability;
pub mod offline;
pub mod render;
pub mod sse;
pub mod types;
pub mod validate;

// Re-exports
pub use client::AgentClient;
pub use client_logger::ClientLogger;
pub use decoder::{Decoder, Payload, PayloadSink, decode_messages};
pub use error::{Error, Result};
pub use log_level::LogLevel;
pub use message_buffer::MessageBuffer;
pub use observability::register_biometrics;
pub use offline::{concat_content, concat_file};
pub use render::{PlainTextRenderer, Renderer, TerminalLogger, format_decode_error, format_message};
pub use sse::{EventRecord, Field, SseScanner};
pub use types::*;
pub use validate::Validate;
