use serde::{Deserialize, Serialize};

use crate::types::{Confirmation, CopilotError, FunctionCall, Reference};

/// A conversational message.
///
/// Messages are what the operator sees and what is sent back to the agent as
/// history.  While a response streams, the aggregator grows `content` and
/// attaches confirmations, references and errors to the latest message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The author role, e.g. "user" or "assistant".
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub role: String,

    /// The accumulated text.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub content: String,

    /// Optional author name.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,

    /// A function call requested by the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,

    /// A pending confirmation.
    #[serde(
        default,
        rename = "copilot_confirmation",
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmation: Option<Confirmation>,

    /// References the agent consulted.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        rename = "copilot_references",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub references: Vec<Reference>,

    /// Errors the agent reported.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        rename = "copilot_errors",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<CopilotError>,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Attach a function call.
    pub fn with_function_call(mut self, function_call: FunctionCall) -> Self {
        self.function_call = Some(function_call);
        self
    }

    /// The subset of this message that is sent back to the agent as history.
    ///
    /// Confirmations, references and errors are display-only and dropped.
    pub fn to_history(&self) -> Message {
        Message {
            role: self.role.clone(),
            content: self.content.clone(),
            function_call: self.function_call.clone(),
            ..Message::default()
        }
    }
}
