//! Folds emitted payloads into a sequence of messages.

use crate::decoder::{Payload, PayloadSink};
use crate::types::{Completion, Confirmation, CopilotError, Reference};
use crate::Message;

/// Accumulates payloads into complete messages, in arrival order.
///
/// Streamed content is grouped by role: a completion whose role differs from
/// the role of the latest message starts a new one.  Confirmations, references
/// and errors attach to the latest message regardless of role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBuffer {
    messages: Vec<Message>,
}

impl MessageBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one payload into the buffer.
    pub fn write(&mut self, payload: Payload) {
        match payload {
            Payload::Completion(completion) => self.write_completion(&completion),
            Payload::Confirmation(confirmation) => self.write_confirmation(confirmation),
            Payload::References(references) => self.write_references(references),
            Payload::Errors(errors) => self.write_errors(errors),
        }
    }

    fn write_completion(&mut self, completion: &Completion) {
        let Some(delta) = completion.first_delta() else {
            return;
        };
        let starts_new_message = self
            .messages
            .last()
            .is_some_and(|last| !last.role.is_empty() && !delta.role.is_empty() && last.role != delta.role);
        if starts_new_message {
            self.messages.push(Message::default());
        }
        let target = self.last_message_mut();
        if !delta.role.is_empty() {
            target.role = delta.role.clone();
        }
        target.content.push_str(&delta.content);
        target.function_call = delta.function_call.clone();
        if !delta.name.is_empty() {
            target.name = delta.name.clone();
        }
    }

    fn write_confirmation(&mut self, confirmation: Confirmation) {
        self.last_message_mut().confirmation = Some(confirmation);
    }

    fn write_references(&mut self, references: Vec<Reference>) {
        self.last_message_mut().references = references;
    }

    fn write_errors(&mut self, errors: Vec<CopilotError>) {
        self.last_message_mut().errors = errors;
    }

    fn last_message_mut(&mut self) -> &mut Message {
        if self.messages.is_empty() {
            self.messages.push(Message::default());
        }
        let last = self.messages.len() - 1;
        &mut self.messages[last]
    }

    /// The message currently receiving content, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The messages assembled so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the buffer, returning its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Number of messages assembled so far.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl PayloadSink for MessageBuffer {
    fn emit(&mut self, payload: Payload) {
        self.write(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Delta, FunctionCall, ReferenceMetadata};

    fn chunk(role: &str, content: &str) -> Payload {
        Payload::Completion(Completion::from_delta(Delta::content(content).with_role(role)))
    }

    #[test]
    fn fragments_of_one_role_are_concatenated() {
        let mut buffer = MessageBuffer::new();
        buffer.write(chunk("assistant", "ahoy"));
        buffer.write(chunk("", " there"));
        assert_eq!(buffer.messages(), &[Message::assistant("ahoy there")]);
    }

    #[test]
    fn role_change_starts_a_new_message() {
        let mut buffer = MessageBuffer::new();
        buffer.write(chunk("assistant", "one"));
        buffer.write(chunk("assistant", " two"));
        buffer.write(chunk("user", "three"));
        buffer.write(chunk("", " four"));
        assert_eq!(
            buffer.into_messages(),
            vec![Message::assistant("one two"), Message::user("three four")]
        );
    }

    #[test]
    fn first_role_is_assigned_to_an_anonymous_message() {
        let mut buffer = MessageBuffer::new();
        buffer.write(chunk("", "a"));
        buffer.write(chunk("assistant", "b"));
        assert_eq!(buffer.messages(), &[Message::assistant("ab")]);
    }

    #[test]
    fn function_call_is_last_write_wins() {
        let mut buffer = MessageBuffer::new();
        buffer.write(Payload::Completion(Completion::from_delta(
            Delta::content("").with_function_call(FunctionCall::new("f", "{\"a\":")),
        )));
        buffer.write(Payload::Completion(Completion::from_delta(
            Delta::content("").with_function_call(FunctionCall::new("f", "1}")),
        )));
        assert_eq!(
            buffer.last_message().and_then(|m| m.function_call.clone()),
            Some(FunctionCall::new("f", "1}"))
        );

        buffer.write(chunk("", "text"));
        assert_eq!(buffer.last_message().and_then(|m| m.function_call.clone()), None);
    }

    #[test]
    fn completion_without_choices_is_ignored() {
        let mut buffer = MessageBuffer::new();
        buffer.write(Payload::Completion(Completion::default()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn attachments_create_a_message_when_empty() {
        let mut buffer = MessageBuffer::new();
        buffer.write(Payload::Confirmation(Confirmation::new("action", "t", "m")));
        assert_eq!(buffer.len(), 1);
        let message = &buffer.messages()[0];
        assert!(message.role.is_empty());
        assert_eq!(message.confirmation, Some(Confirmation::new("action", "t", "m")));
    }

    #[test]
    fn attachments_go_to_the_last_message_and_overwrite() {
        let mut buffer = MessageBuffer::new();
        buffer.write(chunk("assistant", "one"));
        buffer.write(chunk("user", "two"));
        buffer.write(Payload::References(vec![Reference::new(
            "file",
            "1",
            ReferenceMetadata::new("a"),
        )]));
        buffer.write(Payload::References(vec![Reference::new(
            "file",
            "2",
            ReferenceMetadata::new("b"),
        )]));
        buffer.write(Payload::Errors(vec![CopilotError::new("agent", "E", "boom", "x")]));

        let messages = buffer.messages();
        assert!(messages[0].references.is_empty());
        assert_eq!(messages[1].references.len(), 1);
        assert_eq!(messages[1].references[0].id, "2");
        assert_eq!(messages[1].errors.len(), 1);
        assert_eq!(messages[1].content, "two");
    }

    #[test]
    fn content_after_attachment_continues_the_message() {
        let mut buffer = MessageBuffer::new();
        buffer.write(Payload::Confirmation(Confirmation::new("action", "t", "m")));
        buffer.write(chunk("assistant", "go?"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.messages()[0].content, "go?");
        assert!(buffer.messages()[0].confirmation.is_some());
    }
}
