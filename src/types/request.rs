use serde::{Deserialize, Serialize};

use crate::types::Message;

/// The body POSTed to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentRequest {
    /// Identifier of the conversation thread.
    pub copilot_thread_id: String,

    /// The conversation so far, oldest first.
    pub messages: Vec<Message>,

    /// The agent slug; empty when talking to an agent directly.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub agent: String,
}

impl AgentRequest {
    /// Create a request for a thread.
    pub fn new(copilot_thread_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            copilot_thread_id: copilot_thread_id.into(),
            messages,
            agent: String::new(),
        }
    }
}
