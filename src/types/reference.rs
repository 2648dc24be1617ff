use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::Validate;

/// Display information attached to a reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceMetadata {
    /// Name shown to the operator; required.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub display_name: String,

    /// Optional icon.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub display_icon: String,

    /// Optional link.
    #[serde(
        default,
        deserialize_with = "crate::types::null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub display_url: String,
}

impl ReferenceMetadata {
    /// Create metadata with only a display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }
}

/// A reference the agent consulted while answering.
///
/// Sent as one element of the array carried by a `copilot_references` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    /// The kind of reference.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub r#type: String,

    /// A unique identifier.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub id: String,

    /// Opaque agent data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Display information.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub metadata: ReferenceMetadata,
}

impl Reference {
    /// Create a new `Reference`.
    pub fn new(
        r#type: impl Into<String>,
        id: impl Into<String>,
        metadata: ReferenceMetadata,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            id: id.into(),
            data: None,
            metadata,
        }
    }

    /// Attach opaque data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl Validate for Reference {
    const ELEMENT: &'static str = "ref";

    fn missing_attributes(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.r#type.is_empty() {
            missing.push("a type");
        }
        if self.id.is_empty() {
            missing.push("an id");
        }
        if self.metadata.display_name.is_empty() {
            missing.push("a metadata display name");
        }
        missing
    }
}
