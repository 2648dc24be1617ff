//! Error types for copilot-debug.
//!
//! This module defines every failure a decode session, the agent client, or
//! the surrounding tooling can report.  Decode errors carry the raw data
//! fields of the offending record so that a renderer can show the operator
//! exactly what the agent sent.

use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;
use std::sync::Arc;

/// The main error type for copilot-debug.
#[derive(Clone, Debug)]
pub enum Error {
    /// A record used a field name other than `event` or `data`.
    FieldName {
        /// The offending field name.
        field: String,
    },

    /// An event type was not recognized, or the event field was empty.
    EventType {
        /// Human-readable error message.
        message: String,
        /// The data fields of the rejected record.
        data: Vec<String>,
    },

    /// A payload did not match the schema of its event.
    SchemaValidation {
        /// The event whose payload failed, e.g. `copilot_references`.
        event: String,
        /// One line per defect found.
        defects: Vec<String>,
        /// The data fields of the rejected record.
        data: Vec<String>,
    },

    /// A plain data payload declared attributes reserved for special events.
    PayloadConflict {
        /// One line per forbidden attribute present.
        defects: Vec<String>,
        /// The data fields of the rejected record.
        data: Vec<String>,
    },

    /// More than one special event was seen in a single session.
    ProtocolCount {
        /// Number of special events observed.
        count: usize,
    },

    /// The agent answered with a non-success status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Body of the response, or a description of it.
        message: String,
    },

    /// Request was aborted by the client.
    Abort {
        /// Human-readable error message.
        message: String,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The request timed out at the transport.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Invalid configuration or arguments.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// The byte stream failed underneath the scanner.
    Streaming {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Encoding/decoding error.
    Encoding {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new field name error.
    pub fn field_name(field: impl Into<String>) -> Self {
        Error::FieldName {
            field: field.into(),
        }
    }

    /// Creates a new event type error.
    pub fn event_type(message: impl Into<String>, data: Vec<String>) -> Self {
        Error::EventType {
            message: message.into(),
            data,
        }
    }

    /// Creates a new schema validation error.
    pub fn schema_validation(
        event: impl Into<String>,
        defects: Vec<String>,
        data: Vec<String>,
    ) -> Self {
        Error::SchemaValidation {
            event: event.into(),
            defects,
            data,
        }
    }

    /// Creates a new payload conflict error.
    pub fn payload_conflict(defects: Vec<String>, data: Vec<String>) -> Self {
        Error::PayloadConflict { defects, data }
    }

    /// Creates a new protocol count error.
    pub fn protocol_count(count: usize) -> Self {
        Error::ProtocolCount { count }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new abort error.
    pub fn abort(message: impl Into<String>) -> Self {
        Error::Abort {
            message: message.into(),
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new streaming error.
    pub fn streaming(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Streaming {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Returns true if this error is a field name error.
    pub fn is_field_name(&self) -> bool {
        matches!(self, Error::FieldName { .. })
    }

    /// Returns true if this error is an event type error.
    pub fn is_event_type(&self) -> bool {
        matches!(self, Error::EventType { .. })
    }

    /// Returns true if this error is a schema validation error.
    pub fn is_schema_validation(&self) -> bool {
        matches!(self, Error::SchemaValidation { .. })
    }

    /// Returns true if this error is a payload conflict.
    pub fn is_payload_conflict(&self) -> bool {
        matches!(self, Error::PayloadConflict { .. })
    }

    /// Returns true if this error is a protocol count violation.
    pub fn is_protocol_count(&self) -> bool {
        matches!(self, Error::ProtocolCount { .. })
    }

    /// Returns true if this error is an abort.
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort { .. })
    }

    /// Returns true if this error was raised while decoding the wire protocol.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::FieldName { .. }
                | Error::EventType { .. }
                | Error::SchemaValidation { .. }
                | Error::PayloadConflict { .. }
                | Error::ProtocolCount { .. }
        )
    }

    /// Returns the bare diagnostic message, without the category prefix that
    /// `Display` adds.
    pub fn message(&self) -> String {
        match self {
            Error::FieldName { field } => {
                format!("only 'event' and 'data' fields are supported, found: {field}")
            }
            Error::EventType { message, .. } => message.clone(),
            Error::SchemaValidation { defects, .. } => defects.join("\n"),
            Error::PayloadConflict { defects, .. } => defects.join("\n"),
            Error::ProtocolCount { count } => format!(
                "cannot have more than one event type in an invocation, found {count}"
            ),
            Error::Api { message, .. }
            | Error::Abort { message }
            | Error::Connection { message, .. }
            | Error::Timeout { message, .. }
            | Error::Serialization { message, .. }
            | Error::Io { message, .. }
            | Error::HttpClient { message, .. }
            | Error::Validation { message, .. }
            | Error::Url { message, .. }
            | Error::Streaming { message, .. }
            | Error::Encoding { message, .. } => message.clone(),
        }
    }

    /// Returns the individual defect lines of a batched error.
    pub fn defects(&self) -> &[String] {
        match self {
            Error::SchemaValidation { defects, .. } | Error::PayloadConflict { defects, .. } => {
                defects
            }
            _ => &[],
        }
    }

    /// Returns the raw data fields of the record that caused a decode error.
    pub fn data(&self) -> Option<&[String]> {
        match self {
            Error::EventType { data, .. }
            | Error::SchemaValidation { data, .. }
            | Error::PayloadConflict { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FieldName { .. } => {
                write!(f, "Field name error: {}", self.message())
            }
            Error::EventType { message, .. } => {
                write!(f, "Event type error: {message}")
            }
            Error::SchemaValidation { event, .. } => {
                write!(f, "Schema validation error ({event}): {}", self.message())
            }
            Error::PayloadConflict { .. } => {
                write!(f, "Payload conflict: {}", self.message())
            }
            Error::ProtocolCount { .. } => {
                write!(f, "Protocol error: {}", self.message())
            }
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "API error ({status_code}): {message}")
            }
            Error::Abort { message } => {
                write!(f, "Request aborted: {message}")
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Streaming { message, .. } => {
                write!(f, "Streaming error: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "Encoding error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. }
            | Error::Serialization { source, .. }
            | Error::HttpClient { source, .. }
            | Error::Streaming { source, .. }
            | Error::Encoding { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::encoding(format!("UTF-8 error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for copilot-debug operations.
pub type Result<T> = std::result::Result<T, Error>;
