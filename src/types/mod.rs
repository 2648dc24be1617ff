// Public modules
pub mod completion;
pub mod confirmation;
pub mod copilot_error;
pub mod function_call;
pub mod message;
pub mod reference;
pub mod request;

// Re-exports
pub use completion::{Completion, CompletionChoice, Delta};
pub use confirmation::Confirmation;
pub use copilot_error::CopilotError;
pub use function_call::FunctionCall;
pub use message::Message;
pub use reference::{Reference, ReferenceMetadata};
pub use request::AgentRequest;

use serde::{Deserialize, Deserializer};

/// Deserialize an explicit `null` the same as a missing attribute.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_attributes_read_as_empty() {
        let json = r#"{"type":null,"title":"Deploy","message":null}"#;
        let confirmation: Confirmation = serde_json::from_str(json).unwrap();
        assert_eq!(confirmation, Confirmation::new("", "Deploy", ""));

        let json = r#"{"type":"file","id":"r1","metadata":null}"#;
        let reference: Reference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.metadata, ReferenceMetadata::default());

        let json = r#"{"role":null,"content":null,"copilot_references":null,"copilot_errors":null}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message, Message::default());
    }

    #[test]
    fn null_content_in_a_function_call_delta() {
        let json = r#"{"choices":[{"delta":{"role":"assistant","content":null,"function_call":{"name":"f","arguments":null}}}]}"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(
            completion.first_delta(),
            Some(&Delta::default().with_role("assistant").with_function_call(FunctionCall::new("f", "")))
        );

        let empty: Completion = serde_json::from_str(r#"{"choices":null}"#).unwrap();
        assert!(empty.first_delta().is_none());
    }
}
