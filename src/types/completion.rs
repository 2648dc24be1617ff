use serde::{Deserialize, Serialize};

use crate::types::FunctionCall;

/// An incremental fragment of an in-progress message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delta {
    /// The role, usually only present on the first fragment.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub role: String,

    /// The next piece of content.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub content: String,

    /// A function call, replaced wholesale by each fragment that carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,

    /// Optional author name.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
}

impl Delta {
    /// Create a delta carrying only content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set the role of this delta.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the function call of this delta.
    pub fn with_function_call(mut self, function_call: FunctionCall) -> Self {
        self.function_call = Some(function_call);
        self
    }
}

/// One choice of a completion chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionChoice {
    /// The fragment for this choice.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub delta: Delta,
}

/// A streamed completion chunk, the payload of a plain `data` field.
///
/// Only the first choice is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    /// The choices of this chunk.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub choices: Vec<CompletionChoice>,
}

impl Completion {
    /// Create a completion with a single choice.
    pub fn from_delta(delta: Delta) -> Self {
        Self {
            choices: vec![CompletionChoice { delta }],
        }
    }

    /// The delta of the first choice, if any.
    pub fn first_delta(&self) -> Option<&Delta> {
        self.choices.first().map(|choice| &choice.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_deserialization() {
        let json = r#"{"choices":[{"delta":{"role":"assistant","content":"ahoy"}}]}"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(
            completion,
            Completion::from_delta(Delta::content("ahoy").with_role("assistant"))
        );
    }

    #[test]
    fn completion_tolerates_missing_and_extra_fields() {
        let json = r#"{"id":"chatcmpl-1","choices":[{"index":0,"delta":{}}]}"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(completion.first_delta(), Some(&Delta::default()));

        let empty: Completion = serde_json::from_str("{}").unwrap();
        assert!(empty.first_delta().is_none());
    }

    #[test]
    fn function_call_delta() {
        let json = r#"{"choices":[{"delta":{"function_call":{"name":"f","arguments":"{}"}}}]}"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(
            completion.first_delta().and_then(|d| d.function_call.clone()),
            Some(FunctionCall::new("f", "{}"))
        );
    }
}
