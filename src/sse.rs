//! Server-Sent Events (SSE) scanning.
//!
//! This module turns a raw byte stream into event records: ordered lists of
//! named fields terminated by a blank line.  It knows nothing about what the
//! fields mean; classification happens in the decoder.

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_RECORDS};
use crate::{Error, Result};

/// The field carrying an event's type.
pub const EVENT_FIELD: &str = "event";

/// The field carrying an event's payload.
pub const DATA_FIELD: &str = "data";

/// A single `name: value` line of an event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field name.
    pub name: String,
    /// The field value, with the single leading space removed.
    pub value: String,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One blank-line-terminated block of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecord {
    fields: Vec<Field>,
}

impl EventRecord {
    /// Create a record from its fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The fields in arrival order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns true if no field has been scanned.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Pulls event records out of a byte stream, one at a time.
///
/// Chunks may split lines, and multibyte characters, anywhere; bytes are
/// buffered until a full line is available and only complete lines are
/// decoded as UTF-8.
pub struct SseScanner<S> {
    stream: S,
    buffer: Vec<u8>,
    // Start of the unconsumed bytes in `buffer`.
    start: usize,
    // Bytes before this offset hold no newline.
    scanned: usize,
    pending: EventRecord,
    eof: bool,
}

impl<S> SseScanner<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    /// Wrap a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            start: 0,
            scanned: 0,
            pending: EventRecord::default(),
            eof: false,
        }
    }

    /// Return the next complete record, or `None` at end of stream.
    ///
    /// At end of stream an unterminated record with at least one field is
    /// still returned.
    pub async fn next_record(&mut self) -> Result<Option<EventRecord>> {
        loop {
            while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
                let newline = self.scanned + offset;
                let line = decode_line(&self.buffer[self.start..newline])?;
                self.start = newline + 1;
                self.scanned = self.start;
                if let Some(record) = self.push_line(&line) {
                    STREAM_RECORDS.click();
                    return Ok(Some(record));
                }
            }

            self.scanned = self.buffer.len();

            if self.eof {
                let rest = decode_line(&self.buffer[self.start..])?;
                self.buffer.clear();
                self.start = 0;
                self.scanned = 0;
                if !rest.trim().is_empty() {
                    self.push_line(&rest);
                }
                if self.pending.is_empty() {
                    return Ok(None);
                }
                STREAM_RECORDS.click();
                return Ok(Some(std::mem::take(&mut self.pending)));
            }

            match self.stream.next().await {
                Some(Ok(bytes)) => {
                    STREAM_BYTES.count(bytes.len() as u64);
                    self.compact();
                    self.buffer.extend_from_slice(&bytes);
                }
                Some(Err(e)) => return Err(e),
                None => self.eof = true,
            }
        }
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
    }

    /// Feed one line; returns a record when the line terminates one.
    fn push_line(&mut self, line: &str) -> Option<EventRecord> {
        if line.is_empty() {
            if self.pending.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.pending));
        }
        if line.starts_with(':') {
            return None;
        }
        let field = match line.split_once(':') {
            Some((name, value)) => Field::new(name, value.strip_prefix(' ').unwrap_or(value)),
            None => Field::new(line, ""),
        };
        self.pending.fields.push(field);
        None
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => Err(Error::encoding(
            format!("Invalid UTF-8 in stream: {e}"),
            Some(Box::new(e)),
        )),
    }
}
