//! Logging trait for agent round trips.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture the raw wire traffic of a decode session.  Hooks are only invoked
//! when the session runs at `TRACE` verbosity.

use crate::sse::EventRecord;
use crate::{Message, Payload};

/// A trait for logging agent client operations.
///
/// # Example
///
/// ```rust,ignore
/// use copilot_debug::{ClientLogger, EventRecord, Message, Payload};
///
/// struct StderrLogger;
///
/// impl ClientLogger for StderrLogger {
///     fn log_response(&self, status: u16, headers: &[(String, String)]) {
///         eprintln!("HTTP {status} {headers:?}");
///     }
///
///     fn log_record(&self, record: &EventRecord) {
///         eprintln!("record: {record:?}");
///     }
///
///     fn log_payload(&self, payload: &Payload) {
///         eprintln!("payload: {payload:?}");
///     }
///
///     fn log_messages(&self, messages: &[Message]) {
///         eprintln!("{} messages", messages.len());
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log the status line and headers of an agent response.
    ///
    /// Called once per request, before the body is read.
    fn log_response(&self, status: u16, headers: &[(String, String)]);

    /// Log a raw event record exactly as scanned, before classification.
    fn log_record(&self, record: &EventRecord);

    /// Log a payload as it is emitted to the aggregator.
    fn log_payload(&self, payload: &Payload);

    /// Log the finished messages of a session that decoded successfully.
    fn log_messages(&self, messages: &[Message]);
}
