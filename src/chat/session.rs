//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which manages conversation
//! history and sends each turn to the agent.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chat::config::ChatConfig;
use crate::client::AgentClient;
use crate::error::Result;
use crate::render::TerminalLogger;
use crate::{LogLevel, Message};

/// The agent a chat session talks to.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the conversation so far and return the decoded reply.
    async fn invoke(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
        level: &LogLevel,
    ) -> Result<Vec<Message>>;
}

#[async_trait::async_trait]
impl ChatBackend for AgentClient {
    async fn invoke(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
        level: &LogLevel,
    ) -> Result<Vec<Message>> {
        AgentClient::invoke(self, history, cancel, level).await
    }
}

/// A chat session that manages conversation state.
///
/// History lives only in memory.  A failed turn leaves it exactly as it was
/// before the turn started.
pub struct ChatSession<B: ChatBackend = AgentClient> {
    backend: B,
    config: ChatConfig,
    messages: Vec<Message>,
    request_count: u64,
    failed_requests: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The agent endpoint.
    pub url: String,
    /// The active log level.
    pub log_level: LogLevel,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Messages authored by the operator.
    pub user_messages: usize,
    /// Messages authored by anyone else.
    pub agent_messages: usize,
    /// Total number of agent requests made.
    pub total_requests: u64,
    /// Requests that ended in an error.
    pub failed_requests: u64,
}

impl ChatSession<AgentClient> {
    /// Creates a session talking to the agent named by `config`.
    ///
    /// Raw traffic is echoed to stderr whenever the session runs at `TRACE`.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let logger = TerminalLogger::with_color(config.use_color);
        let client =
            AgentClient::new(&config.url, config.token.clone())?.with_logger(Arc::new(logger));
        Ok(Self::with_backend(client, config))
    }
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a new chat session with a custom backend.
    pub fn with_backend(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            messages: Vec::new(),
            request_count: 0,
            failed_requests: 0,
        }
    }

    /// Sends a user message and returns the agent's reply.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Sends the whole history to the agent
    /// 3. Adds each reply message to history, keeping only its role, content
    ///    and function call
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the decode fails; history is
    /// rolled back.
    pub async fn send(
        &mut self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>> {
        let previous_len = self.messages.len();
        self.messages.push(Message::user(user_input));
        self.request_count += 1;

        match self
            .backend
            .invoke(&self.messages, cancel, &self.config.log_level)
            .await
        {
            Ok(replies) => {
                self.messages
                    .extend(replies.iter().map(Message::to_history));
                Ok(replies)
            }
            Err(err) => {
                self.messages.truncate(previous_len);
                self.failed_requests += 1;
                Err(err)
            }
        }
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the conversation history, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the active log level.
    pub fn log_level(&self) -> &LogLevel {
        &self.config.log_level
    }

    /// Changes the log level used for subsequent turns.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.config.log_level = log_level;
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let user_messages = self.messages.iter().filter(|m| m.role == "user").count();
        SessionStats {
            url: self.config.url.clone(),
            log_level: self.config.log_level.clone(),
            message_count: self.messages.len(),
            user_messages,
            agent_messages: self.messages.len() - user_messages,
            total_requests: self.request_count,
            failed_requests: self.failed_requests,
        }
    }
}
