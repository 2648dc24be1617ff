use serde::{Deserialize, Serialize};

use crate::validate::Validate;

/// An error reported by the agent inside the stream.
///
/// Sent as one element of the array carried by a `copilot_errors` event.
/// Every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CopilotError {
    /// The kind of error, e.g. "agent".
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub r#type: String,

    /// A machine-readable code.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub code: String,

    /// Human-readable description.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub message: String,

    /// Identifier of the failing operation.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub identifier: String,
}

impl CopilotError {
    /// Create a new `CopilotError`.
    pub fn new(
        r#type: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            code: code.into(),
            message: message.into(),
            identifier: identifier.into(),
        }
    }
}

impl Validate for CopilotError {
    const ELEMENT: &'static str = "error";

    fn missing_attributes(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.r#type.is_empty() {
            missing.push("a type");
        }
        if self.code.is_empty() {
            missing.push("a code");
        }
        if self.message.is_empty() {
            missing.push("a message");
        }
        if self.identifier.is_empty() {
            missing.push("an identifier");
        }
        missing
    }
}
