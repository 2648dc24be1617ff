use serde::{Deserialize, Serialize};

/// A function call requested by the agent.
///
/// Arguments are kept as the raw string the agent sent; they are not parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// The name of the function to call.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub name: String,

    /// The arguments, usually JSON-encoded.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub arguments: String,
}

impl FunctionCall {
    /// Create a new `FunctionCall`.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn function_call_serialization() {
        let call = FunctionCall::new("lookup", r#"{"q":"rust"}"#);
        assert_eq!(
            to_value(&call).unwrap(),
            json!({"name": "lookup", "arguments": "{\"q\":\"rust\"}"})
        );
    }

    #[test]
    fn missing_arguments_default_to_empty() {
        let call: FunctionCall = serde_json::from_str(r#"{"name":"lookup"}"#).unwrap();
        assert_eq!(call, FunctionCall::new("lookup", ""));
    }
}
