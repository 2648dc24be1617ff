//! Classification, validation and emission of wire events.
//!
//! The [`Decoder`] pulls records from an [`SseScanner`], partitions each
//! record into its event type and data fields, validates the data against the
//! schema of that event, and hands every accepted payload to a
//! [`PayloadSink`].  Any failure aborts the whole session: records after a
//! bad one are never looked at.
//!
//! Confirmation, references and errors events are "special".  A session may
//! carry at most one of them in total; the decoder counts them and
//! [`Decoder::validate_session`] reports a violation once the scan is done.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client_logger::ClientLogger;
use crate::message_buffer::MessageBuffer;
use crate::observability::{
    STREAM_DURATION, STREAM_ERRORS, STREAM_PAYLOADS, STREAM_PROTOCOL_VIOLATIONS, STREAM_SKIPPED,
    STREAM_SPECIAL_EVENTS,
};
use crate::sse::{DATA_FIELD, EVENT_FIELD, EventRecord, SseScanner};
use crate::types::{Completion, Confirmation, CopilotError, FunctionCall, Reference};
use crate::validate::{Validate, batch_defects};
use crate::{Error, LogLevel, Message, Result};

/// Event type of a confirmation request.
pub const CONFIRMATION_EVENT: &str = "copilot_confirmation";

/// Event type of a references batch.
pub const REFERENCES_EVENT: &str = "copilot_references";

/// Event type of an errors batch.
pub const ERRORS_EVENT: &str = "copilot_errors";

/// Data value marking the end of useful content.
pub const DONE_SENTINEL: &str = "[DONE]";

/// The most special events a single session may carry.
pub const MAX_SPECIAL_EVENTS: usize = 1;

/// Label used for errors raised while decoding plain data fields.
const PLAIN_DATA: &str = "data";

/// A decoded, schema-checked payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Payload {
    /// A streamed completion chunk from a plain data field.
    Completion(Completion),
    /// A `copilot_confirmation` event.
    Confirmation(Confirmation),
    /// A `copilot_references` event.
    References(Vec<Reference>),
    /// A `copilot_errors` event.
    Errors(Vec<CopilotError>),
}

impl Payload {
    /// Returns true for confirmation, references and errors payloads.
    pub fn is_special(&self) -> bool {
        !matches!(self, Payload::Completion(_))
    }
}

/// Receives payloads in arrival order.
///
/// Emission is synchronous: the sink runs to completion before the decoder
/// requests the next record.
pub trait PayloadSink {
    /// Accept one payload.
    fn emit(&mut self, payload: Payload);
}

impl<F: FnMut(Payload)> PayloadSink for F {
    fn emit(&mut self, payload: Payload) {
        self(payload)
    }
}

/// Drives the scan loop of a single session.
pub struct Decoder<S, P> {
    scanner: SseScanner<S>,
    sink: P,
    special_events: usize,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl<S, P> Decoder<S, P>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    P: PayloadSink,
{
    /// Create a decoder reading `byte_stream` and emitting into `sink`.
    pub fn new(byte_stream: S, sink: P) -> Self {
        Self {
            scanner: SseScanner::new(byte_stream),
            sink,
            special_events: 0,
            logger: None,
        }
    }

    /// Send raw records and payloads to `logger` when running at `TRACE`.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Decode the whole stream.
    ///
    /// Returns `Ok(())` at end of stream.  Cancellation is checked before
    /// every record and also interrupts a read that is waiting on the
    /// transport.  The special-event invariant is not checked here; call
    /// [`Decoder::validate_session`] afterwards.
    pub async fn run(&mut self, cancel: &CancellationToken, level: &LogLevel) -> Result<()> {
        let start = Instant::now();
        let result = self.scan(cancel, level).await;
        STREAM_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            STREAM_ERRORS.click();
        }
        result
    }

    async fn scan(&mut self, cancel: &CancellationToken, level: &LogLevel) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(Error::abort("decode cancelled"));
            }
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::abort("decode cancelled")),
                next = self.scanner.next_record() => next?,
            };
            let Some(record) = next else {
                return Ok(());
            };
            if level.is_trace()
                && let Some(logger) = &self.logger
            {
                logger.log_record(&record);
            }
            self.decode_record(&record, level)?;
        }
    }

    /// Classify one record and emit its payloads.
    pub fn decode_record(&mut self, record: &EventRecord, level: &LogLevel) -> Result<()> {
        let (event, data) = partition(record)?;
        let diagnostics = level.is_debug();

        match event.as_deref() {
            Some(CONFIRMATION_EVENT) => {
                self.count_special_event();
                for field in &data {
                    let confirmation = decode_confirmation(field, &data)?;
                    self.emit(Payload::Confirmation(confirmation), level);
                }
                Ok(())
            }
            Some(REFERENCES_EVENT) => {
                self.count_special_event();
                for field in &data {
                    let references =
                        decode_batch::<Reference>(REFERENCES_EVENT, "references", field, &data)?;
                    self.emit(Payload::References(references), level);
                }
                Ok(())
            }
            Some(ERRORS_EVENT) => {
                self.count_special_event();
                for field in &data {
                    let errors =
                        decode_batch::<CopilotError>(ERRORS_EVENT, "errors", field, &data)?;
                    self.emit(Payload::Errors(errors), level);
                }
                Ok(())
            }
            Some(other) if !other.is_empty() => {
                if diagnostics {
                    Err(Error::event_type(format!("type not supported: {other}"), data))
                } else {
                    STREAM_SKIPPED.click();
                    Ok(())
                }
            }
            Some(_) if diagnostics => Err(Error::event_type("event field must have a type", data)),
            _ => self.emit_plain_data(&data, level),
        }
    }

    fn emit_plain_data(&mut self, data: &[String], level: &LogLevel) -> Result<()> {
        for field in data {
            if field.is_empty() || field == DONE_SENTINEL {
                STREAM_SKIPPED.click();
                continue;
            }

            if let Ok(shape) = serde_json::from_str::<MessageShape>(field) {
                let conflicts = shape.conflicts();
                if !conflicts.is_empty() {
                    return Err(Error::payload_conflict(conflicts, data.to_vec()));
                }
            }

            let completion = serde_json::from_str::<Completion>(field).map_err(|e| {
                Error::schema_validation(
                    PLAIN_DATA,
                    vec![format!("failed to unmarshal response: {e}")],
                    data.to_vec(),
                )
            })?;
            self.emit(Payload::Completion(completion), level);
        }
        Ok(())
    }

    fn emit(&mut self, payload: Payload, level: &LogLevel) {
        STREAM_PAYLOADS.click();
        if level.is_trace()
            && let Some(logger) = &self.logger
        {
            logger.log_payload(&payload);
        }
        self.sink.emit(payload);
    }

    fn count_special_event(&mut self) {
        STREAM_SPECIAL_EVENTS.click();
        self.special_events += 1;
    }
}

impl<S, P> Decoder<S, P> {
    /// Number of special events classified so far.
    pub fn special_event_count(&self) -> usize {
        self.special_events
    }

    /// Returns true once more than one special event has been classified.
    pub fn special_event_limit_exceeded(&self) -> bool {
        self.special_events > MAX_SPECIAL_EVENTS
    }

    /// Check the session-wide special-event invariant.
    pub fn validate_session(&self) -> Result<()> {
        if self.special_event_limit_exceeded() {
            STREAM_PROTOCOL_VIOLATIONS.click();
            return Err(Error::protocol_count(self.special_events));
        }
        Ok(())
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Consume the decoder, returning the sink.
    pub fn into_sink(self) -> P {
        self.sink
    }
}

/// Decode a whole response body into finished messages.
///
/// This runs the decoder into a [`MessageBuffer`], then checks the
/// special-event invariant.  Any error discards the messages.
pub async fn decode_messages<S>(
    byte_stream: S,
    cancel: &CancellationToken,
    level: &LogLevel,
    logger: Option<Arc<dyn ClientLogger>>,
) -> Result<Vec<Message>>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    let mut decoder = Decoder::new(byte_stream, MessageBuffer::new());
    if let Some(logger) = &logger {
        decoder = decoder.with_logger(Arc::clone(logger));
    }
    decoder.run(cancel, level).await?;
    decoder.validate_session()?;
    let messages = decoder.into_sink().into_messages();
    if level.is_trace()
        && let Some(logger) = &logger
    {
        logger.log_messages(&messages);
    }
    Ok(messages)
}

/// Split a record into its event type and its data values.
///
/// A missing event field yields `None`; a repeated one keeps the last value.
fn partition(record: &EventRecord) -> Result<(Option<String>, Vec<String>)> {
    let mut event = None;
    let mut data = Vec::new();
    for field in record.fields() {
        match field.name.as_str() {
            EVENT_FIELD => event = Some(field.value.clone()),
            DATA_FIELD => data.push(field.value.clone()),
            other => return Err(Error::field_name(other)),
        }
    }
    Ok((event, data))
}

fn decode_confirmation(field: &str, data: &[String]) -> Result<Confirmation> {
    let confirmation = serde_json::from_str::<Confirmation>(field).map_err(|_| {
        Error::schema_validation(
            CONFIRMATION_EVENT,
            vec![format!("ensure data is of type {CONFIRMATION_EVENT}")],
            data.to_vec(),
        )
    })?;
    let defects = confirmation.defects(None);
    if !defects.is_empty() {
        return Err(Error::schema_validation(
            CONFIRMATION_EVENT,
            defects,
            data.to_vec(),
        ));
    }
    Ok(confirmation)
}

fn decode_batch<T>(event: &str, noun: &str, field: &str, data: &[String]) -> Result<Vec<T>>
where
    T: DeserializeOwned + Validate,
{
    let items = serde_json::from_str::<Vec<T>>(field).map_err(|_| {
        Error::schema_validation(
            event,
            vec![format!("ensure data is an array of {event}")],
            data.to_vec(),
        )
    })?;
    if items.is_empty() {
        return Err(Error::schema_validation(
            event,
            vec![format!("no {noun} found")],
            data.to_vec(),
        ));
    }
    let defects = batch_defects(&items);
    if !defects.is_empty() {
        return Err(Error::schema_validation(event, defects, data.to_vec()));
    }
    Ok(items)
}

/// A plain data payload read as a whole message.
///
/// Only payloads that decode as a message are checked for reserved
/// attributes; a non-null reserved attribute is a conflict.
#[derive(Deserialize)]
#[allow(dead_code)]
struct MessageShape {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    role: String,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    content: String,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    name: String,
    #[serde(default)]
    function_call: Option<FunctionCall>,
    #[serde(default)]
    copilot_confirmation: Option<Confirmation>,
    #[serde(default)]
    copilot_errors: Option<Vec<CopilotError>>,
    #[serde(default)]
    copilot_references: Option<Vec<Reference>>,
}

impl MessageShape {
    fn conflicts(&self) -> Vec<String> {
        let mut conflicts = Vec::new();
        if self.copilot_confirmation.is_some() {
            conflicts.push("setting confirmation in a message payload is not supported".to_string());
        }
        if self.copilot_errors.is_some() {
            conflicts.push("setting errors in a message payload is not supported".to_string());
        }
        if self.copilot_references.is_some() {
            conflicts.push("setting references in a message payload is not supported".to_string());
        }
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::Field;
    use crate::types::{Delta, ReferenceMetadata};
    use futures::stream;
    use std::sync::Mutex;

    fn body(text: &'static str) -> impl Stream<Item = Result<Bytes>> + Unpin {
        stream::iter(vec![Ok(Bytes::from_static(text.as_bytes()))])
    }

    fn record(fields: &[(&str, &str)]) -> EventRecord {
        EventRecord::new(
            fields
                .iter()
                .map(|(name, value)| Field::new(*name, *value))
                .collect(),
        )
    }

    fn decode_one(record: &EventRecord, level: LogLevel) -> (Result<()>, Vec<Payload>) {
        let mut payloads = Vec::new();
        let result = {
            let mut decoder = Decoder::new(body(""), |p: Payload| payloads.push(p));
            decoder.decode_record(record, &level)
        };
        (result, payloads)
    }

    async fn decode_all(text: &'static str, level: LogLevel) -> (Result<()>, Vec<Payload>, usize) {
        let mut payloads = Vec::new();
        let (result, count) = {
            let mut decoder = Decoder::new(body(text), |p: Payload| payloads.push(p));
            let result = decoder.run(&CancellationToken::new(), &level).await;
            (result, decoder.special_event_count())
        };
        (result, payloads, count)
    }

    #[test]
    fn confirmation_is_emitted() {
        let rec = record(&[
            ("event", "copilot_confirmation"),
            ("data", r#"{"type":"action","title":"T","message":"M","confirmation":{"id":1}}"#),
        ]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        result.unwrap();
        assert_eq!(
            payloads,
            vec![Payload::Confirmation(
                Confirmation::new("action", "T", "M").with_confirmation(serde_json::json!({"id": 1}))
            )]
        );
    }

    #[test]
    fn confirmation_reports_all_missing_attributes() {
        let rec = record(&[("event", "copilot_confirmation"), ("data", "{}")]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        let err = result.unwrap_err();
        assert!(err.is_schema_validation());
        assert_eq!(
            err.message(),
            "confirmation is missing a type\nconfirmation is missing a title\nconfirmation is missing a message"
        );
        assert!(payloads.is_empty());
    }

    #[test]
    fn confirmation_must_be_an_object() {
        let rec = record(&[("event", "copilot_confirmation"), ("data", "[1,2]")]);
        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(
            result.unwrap_err().message(),
            "ensure data is of type copilot_confirmation"
        );
    }

    #[test]
    fn references_object_is_rejected() {
        let data = r#"{"type": "confirm", "title": "Test Confirmation", "message": "This is a test confirmation"}"#;
        let rec = record(&[("event", "copilot_references"), ("data", data)]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        let err = result.unwrap_err();
        assert!(err.is_schema_validation());
        assert_eq!(err.message(), "ensure data is an array of copilot_references");
        assert_eq!(err.data(), Some(&[data.to_string()][..]));
        assert!(payloads.is_empty());
    }

    #[test]
    fn empty_batches_are_rejected() {
        let rec = record(&[("event", "copilot_references"), ("data", "[]")]);
        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(result.unwrap_err().message(), "no references found");

        let rec = record(&[("event", "copilot_errors"), ("data", "[]")]);
        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(result.unwrap_err().message(), "no errors found");
    }

    #[test]
    fn reference_defects_are_batched_across_elements() {
        let rec = record(&[("event", "copilot_references"), ("data", r#"[{}, {"data": 1}]"#)]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        let err = result.unwrap_err();
        assert_eq!(
            err.defects(),
            &[
                "ref 0 is missing a type".to_string(),
                "ref 0 is missing an id".to_string(),
                "ref 0 is missing a metadata display name".to_string(),
                "ref 1 is missing a type".to_string(),
                "ref 1 is missing an id".to_string(),
                "ref 1 is missing a metadata display name".to_string(),
            ]
        );
        assert!(payloads.is_empty());
    }

    #[test]
    fn errors_batch_is_emitted_whole() {
        let rec = record(&[
            ("event", "copilot_errors"),
            (
                "data",
                r#"[{"type":"agent","code":"E1","message":"a","identifier":"1"},{"type":"agent","code":"E2","message":"b","identifier":"2"}]"#,
            ),
        ]);
        let (result, payloads) = decode_one(&rec, LogLevel::None);
        result.unwrap();
        assert_eq!(
            payloads,
            vec![Payload::Errors(vec![
                CopilotError::new("agent", "E1", "a", "1"),
                CopilotError::new("agent", "E2", "b", "2"),
            ])]
        );
    }

    #[test]
    fn error_defects_use_error_prefix() {
        let rec = record(&[("event", "copilot_errors"), ("data", r#"[{"type":"agent"}]"#)]);
        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(
            result.unwrap_err().message(),
            "error 0 is missing a code\nerror 0 is missing a message\nerror 0 is missing an identifier"
        );
    }

    #[test]
    fn unknown_field_name_fails() {
        let rec = record(&[("retry", "1000"), ("data", "{}")]);
        let (result, _) = decode_one(&rec, LogLevel::None);
        let err = result.unwrap_err();
        assert!(err.is_field_name());
        assert!(err.message().ends_with("found: retry"));
    }

    #[test]
    fn unknown_event_is_fatal_only_with_diagnostics() {
        let rec = record(&[("event", "ping"), ("data", "{}")]);

        let (result, _) = decode_one(&rec, LogLevel::Debug);
        let err = result.unwrap_err();
        assert!(err.is_event_type());
        assert_eq!(err.message(), "type not supported: ping");

        let (result, payloads) = decode_one(&rec, LogLevel::None);
        result.unwrap();
        assert!(payloads.is_empty());

        let (result, _) = decode_one(&rec, LogLevel::Trace);
        assert!(result.is_err());
    }

    #[test]
    fn empty_event_type_falls_through_without_diagnostics() {
        let rec = record(&[("event", ""), ("data", r#"{"choices":[{"delta":{"content":"hi"}}]}"#)]);

        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(result.unwrap_err().message(), "event field must have a type");

        let (result, payloads) = decode_one(&rec, LogLevel::None);
        result.unwrap();
        assert_eq!(
            payloads,
            vec![Payload::Completion(Completion::from_delta(Delta::content("hi")))]
        );
    }

    #[test]
    fn plain_data_skips_empty_and_done() {
        let rec = record(&[("data", ""), ("data", "[DONE]")]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        result.unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn plain_data_rejects_reserved_attributes() {
        let rec = record(&[(
            "data",
            r#"{"copilot_confirmation":{"type":"a"},"copilot_references":[],"choices":[]}"#,
        )]);
        let (result, payloads) = decode_one(&rec, LogLevel::None);
        let err = result.unwrap_err();
        assert!(err.is_payload_conflict());
        assert_eq!(
            err.defects(),
            &[
                "setting confirmation in a message payload is not supported".to_string(),
                "setting references in a message payload is not supported".to_string(),
            ]
        );
        assert!(payloads.is_empty());
    }

    #[test]
    fn plain_data_allows_null_reserved_attributes() {
        let rec = record(&[(
            "data",
            r#"{"copilot_errors":null,"choices":[{"delta":{"content":"x"}}]}"#,
        )]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        result.unwrap();
        assert_eq!(payloads.len(), 1);
    }

    #[test]
    fn malformed_completion_is_a_schema_error() {
        let rec = record(&[("data", "not json")]);
        let (result, _) = decode_one(&rec, LogLevel::None);
        let err = result.unwrap_err();
        assert!(err.is_schema_validation());
        assert!(err.message().starts_with("failed to unmarshal response: "));
    }

    #[test]
    fn plain_data_tolerates_null_content() {
        let rec = record(&[(
            "data",
            r#"{"choices":[{"delta":{"role":"assistant","content":null,"function_call":{"name":"f","arguments":""}}}]}"#,
        )]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        result.unwrap();
        assert_eq!(
            payloads,
            vec![Payload::Completion(Completion::from_delta(
                Delta::default()
                    .with_role("assistant")
                    .with_function_call(FunctionCall::new("f", ""))
            ))]
        );
    }

    #[test]
    fn null_confirmation_type_is_a_missing_attribute() {
        let rec = record(&[
            ("event", "copilot_confirmation"),
            ("data", r#"{"type":null,"title":"T","message":"M"}"#),
        ]);
        let (result, _) = decode_one(&rec, LogLevel::Debug);
        assert_eq!(result.unwrap_err().message(), "confirmation is missing a type");
    }

    #[test]
    fn reserved_attribute_with_incomplete_body_conflicts() {
        let rec = record(&[(
            "data",
            r#"{"choices":[],"copilot_confirmation":{"type":"a","title":null,"message":"m"}}"#,
        )]);
        let (result, payloads) = decode_one(&rec, LogLevel::None);
        let err = result.unwrap_err();
        assert!(err.is_payload_conflict());
        assert_eq!(
            err.defects(),
            &["setting confirmation in a message payload is not supported".to_string()]
        );
        assert!(payloads.is_empty());
    }

    #[test]
    fn conflicts_are_only_checked_on_message_shaped_payloads() {
        let rec = record(&[("data", r#"{"role":5,"copilot_errors":[]}"#)]);
        let (result, payloads) = decode_one(&rec, LogLevel::Debug);
        result.unwrap();
        assert_eq!(payloads, vec![Payload::Completion(Completion::default())]);
    }

    #[tokio::test]
    async fn confirmation_then_completion_session() {
        let stream = "event: copilot_confirmation\n\
data: {\"type\": \"confirm\", \"title\": \"Test Confirmation\", \"message\": \"This is a test confirmation\"}\n\
\n\
data: {\"choices\":[{\"delta\":{\"content\":\"ahoy there\"}}]}\n\
\n";
        let (result, payloads, count) = decode_all(stream, LogLevel::Debug).await;
        result.unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            payloads,
            vec![
                Payload::Confirmation(Confirmation::new(
                    "confirm",
                    "Test Confirmation",
                    "This is a test confirmation"
                )),
                Payload::Completion(Completion::from_delta(Delta::content("ahoy there"))),
            ]
        );
    }

    #[tokio::test]
    async fn bad_record_halts_the_stream() {
        let stream = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n\
retry: 10\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n";
        let (result, payloads, _) = decode_all(stream, LogLevel::None).await;
        assert!(result.unwrap_err().is_field_name());
        assert_eq!(payloads.len(), 1);
    }

    #[tokio::test]
    async fn two_special_events_violate_the_session() {
        let stream = "event: copilot_confirmation\n\
data: {\"type\":\"a\",\"title\":\"t\",\"message\":\"m\"}\n\n\
event: copilot_references\n\
data: [{\"type\":\"r\",\"id\":\"1\",\"metadata\":{\"display_name\":\"d\"}}]\n\n";
        let mut payloads = Vec::new();
        let mut decoder = Decoder::new(body(stream), |p: Payload| payloads.push(p));
        decoder
            .run(&CancellationToken::new(), &LogLevel::Debug)
            .await
            .unwrap();
        assert_eq!(decoder.special_event_count(), 2);
        assert!(decoder.special_event_limit_exceeded());
        let err = decoder.validate_session().unwrap_err();
        assert!(err.is_protocol_count());
    }

    #[tokio::test]
    async fn special_events_count_once_per_record() {
        let stream = "event: copilot_references\n\
data: [{\"type\":\"r\",\"id\":\"1\",\"metadata\":{\"display_name\":\"d\"}},{\"type\":\"r\",\"id\":\"2\",\"metadata\":{\"display_name\":\"e\"}}]\n\n";
        let (result, payloads, count) = decode_all(stream, LogLevel::Debug).await;
        result.unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            payloads,
            vec![Payload::References(vec![
                Reference::new("r", "1", ReferenceMetadata::new("d")),
                Reference::new("r", "2", ReferenceMetadata::new("e")),
            ])]
        );
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_reading() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut decoder = Decoder::new(body("data: [DONE]\n\n"), |_: Payload| {});
        let err = decoder.run(&cancel, &LogLevel::None).await.unwrap_err();
        assert!(err.is_abort());
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_pending_read() {
        let cancel = CancellationToken::new();
        let pending = stream::pending::<Result<Bytes>>();
        let mut decoder = Decoder::new(pending, |_: Payload| {});
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let err = decoder.run(&cancel, &LogLevel::None).await.unwrap_err();
        assert!(err.is_abort());
    }

    #[derive(Default)]
    struct RecordingLogger {
        records: Mutex<usize>,
        payloads: Mutex<usize>,
        messages: Mutex<usize>,
    }

    impl ClientLogger for RecordingLogger {
        fn log_response(&self, _status: u16, _headers: &[(String, String)]) {}

        fn log_record(&self, _record: &EventRecord) {
            *self.records.lock().unwrap() += 1;
        }

        fn log_payload(&self, _payload: &Payload) {
            *self.payloads.lock().unwrap() += 1;
        }

        fn log_messages(&self, messages: &[Message]) {
            *self.messages.lock().unwrap() += messages.len();
        }
    }

    #[tokio::test]
    async fn decode_messages_logs_only_at_trace() {
        let stream = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"hi\"}}]}\n\n\
data: [DONE]\n\n";
        let logger = Arc::new(RecordingLogger::default());
        let messages = decode_messages(
            body(stream),
            &CancellationToken::new(),
            &LogLevel::Trace,
            Some(logger.clone() as Arc<dyn ClientLogger>),
        )
        .await
        .unwrap();
        assert_eq!(messages, vec![Message::assistant("hi")]);
        assert_eq!(*logger.records.lock().unwrap(), 2);
        assert_eq!(*logger.payloads.lock().unwrap(), 1);
        assert_eq!(*logger.messages.lock().unwrap(), 1);

        let quiet = Arc::new(RecordingLogger::default());
        decode_messages(
            body(stream),
            &CancellationToken::new(),
            &LogLevel::Debug,
            Some(quiet.clone() as Arc<dyn ClientLogger>),
        )
        .await
        .unwrap();
        assert_eq!(*quiet.records.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn decode_messages_discards_output_on_violation() {
        let stream = "event: copilot_errors\n\
data: [{\"type\":\"a\",\"code\":\"c\",\"message\":\"m\",\"identifier\":\"i\"}]\n\n\
event: copilot_errors\n\
data: [{\"type\":\"a\",\"code\":\"c\",\"message\":\"m\",\"identifier\":\"i\"}]\n\n";
        let err = decode_messages(body(stream), &CancellationToken::new(), &LogLevel::None, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "cannot have more than one event type in an invocation, found 2"
        );
    }
}
