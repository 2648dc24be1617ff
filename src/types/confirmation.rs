use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::Validate;

/// A request from the agent for the operator to confirm an action.
///
/// Sent as the data of a `copilot_confirmation` event.  `type`, `title` and
/// `message` must all be non-empty; the nested `confirmation` payload is
/// opaque and echoed back to the agent unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    /// The kind of confirmation, e.g. "action".
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub r#type: String,

    /// Short title shown to the operator.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub title: String,

    /// The question being asked.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub message: String,

    /// Opaque agent data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Value>,
}

impl Confirmation {
    /// Create a new `Confirmation` without an opaque payload.
    pub fn new(
        r#type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            title: title.into(),
            message: message.into(),
            confirmation: None,
        }
    }

    /// Attach the opaque confirmation payload.
    pub fn with_confirmation(mut self, confirmation: Value) -> Self {
        self.confirmation = Some(confirmation);
        self
    }
}

impl Validate for Confirmation {
    const ELEMENT: &'static str = "confirmation";

    fn missing_attributes(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.r#type.is_empty() {
            missing.push("a type");
        }
        if self.title.is_empty() {
            missing.push("a title");
        }
        if self.message.is_empty() {
            missing.push("a message");
        }
        missing
    }
}
