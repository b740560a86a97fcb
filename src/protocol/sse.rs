// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server-sent events framing.
//!
//! [`SseDecoder`] turns raw body chunks into [`SseEvent`]s. Chunks may split
//! lines (or UTF-8 sequences) at arbitrary positions. [`EventStream`] wraps a
//! byte stream and yields one decoded event at a time.

use std::collections::VecDeque;

use futures_util::stream::{BoxStream, Stream, StreamExt};

use crate::error::ProtocolError;

/// Event type used when the server does not send an `event:` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// A single dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
    /// Last event id seen on the stream.
    pub id: Option<String>,
}

impl SseEvent {
    /// Returns the event type, defaulting to `message`.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.event.as_deref().unwrap_or(DEFAULT_EVENT_TYPE)
    }
}

/// Incremental decoder for the `text/event-stream` format.
///
/// # Examples
///
/// ```
/// use hconnect_lib::protocol::SseDecoder;
///
/// let mut decoder = SseDecoder::new();
/// assert!(decoder.decode(b"event: KEEP-ALIVE\n").is_empty());
///
/// let events = decoder.decode(b"\nevent: STATUS\ndata: {\"items\":[]}\n\n");
/// assert_eq!(events.len(), 2);
/// assert_eq!(events[0].kind(), "KEEP-ALIVE");
/// assert_eq!(events[1].data, "{\"items\":[]}");
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every event completed by it.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..pos]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match name {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            // Reconnect timing is ours, not the server's.
            "retry" => {}
            other => tracing::trace!(field = other, "Ignored event stream field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() && self.event.is_none() {
            return None;
        }
        Some(SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.last_id.clone(),
        })
    }
}

/// A decoded event stream over an HTTP response body.
pub struct EventStream {
    body: BoxStream<'static, Result<Vec<u8>, ProtocolError>>,
    decoder: SseDecoder,
    pending: VecDeque<SseEvent>,
}

impl EventStream {
    /// Wraps a stream of body chunks.
    pub fn new<S>(body: S) -> Self
    where
        S: Stream<Item = Result<Vec<u8>, ProtocolError>> + Send + 'static,
    {
        Self {
            body: body.boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    /// Wraps a `reqwest` response body.
    #[must_use]
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(
            response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ProtocolError::Http)),
        )
    }

    /// Waits for the next event.
    ///
    /// # Errors
    ///
    /// Returns the transport error that broke the body, or
    /// [`ProtocolError::StreamEnded`] when the server closed it.
    pub async fn next_event(&mut self) -> Result<SseEvent, ProtocolError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }
            match self.body.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.decode(&chunk)),
                Some(Err(e)) => return Err(e),
                None => return Err(ProtocolError::StreamEnded),
            }
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
