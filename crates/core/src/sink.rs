//! # Streaming Sinks
//!
//! Event and token sinks that multiplex concurrent producers onto a single
//! ordered output channel. During the loop only one producer emits at a
//! time; once enrichment fans out, up to four agents stream concurrently.
//! Every emission is forwarded as one complete, pre-serialized record, so
//! no event body can be split by another producer's bytes.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

/// Event names recognized by the transport layer.
pub mod events {
    pub const ARTICLE_TOKEN: &str = "article_token";
    pub const EVALUATION_TOKEN: &str = "evaluation_token";
    pub const REVISION_PLAN_TOKEN: &str = "revision_plan_token";
    pub const ROUND_COMPLETE: &str = "round_complete";
    pub const CONVERGED: &str = "converged";
    pub const REFERENCES_TOKEN: &str = "references_token";
    pub const INFOBOX_TOKEN: &str = "infobox_token";
    pub const SEEALSO_TOKEN: &str = "seealso_token";
    pub const CATEGORY_TOKEN: &str = "category_token";
    pub const ARTICLE_DONE: &str = "article_done";
    pub const DONE: &str = "done";
    pub const ERROR: &str = "error";
}

/// Receives streamed token fragments from a single generation call.
///
/// Implementations may buffer, forward over a channel, or write directly;
/// the controller stays decoupled from the transport.
pub trait TokenSink: Send + Sync {
    fn accept(&self, token: &str);
}

/// Receives named events bound for the remote consumer.
pub trait EventSink: Send + Sync {
    /// Emit an opaque text payload. The payload is JSON-encoded before
    /// forwarding so embedded line breaks cannot corrupt transport framing.
    fn emit(&self, event: &str, payload: &str);

    /// Emit a structured payload, serialized as-is.
    fn emit_json(&self, event: &str, payload: Value);
}

/// Token sink that drops everything.
pub struct NullSink;

impl TokenSink for NullSink {
    fn accept(&self, _token: &str) {}
}

/// Event sink that drops everything.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: &str, _payload: &str) {}
    fn emit_json(&self, _event: &str, _payload: Value) {}
}

/// One fully-serialized event ready for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEvent {
    pub name: String,
    /// JSON-encoded payload body.
    pub data: String,
}

/// Event sink forwarding over an unbounded channel.
///
/// Each `emit` builds a complete [`SinkEvent`] and performs a single
/// channel send, so concurrent producers can never interleave mid-event.
/// Sends to a closed channel are ignored - the consumer has gone away and
/// the remaining run just finishes without an audience.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: &str) {
        let data = serde_json::to_string(payload).unwrap_or_default();
        let _ = self.tx.send(SinkEvent {
            name: event.to_string(),
            data,
        });
    }

    fn emit_json(&self, event: &str, payload: Value) {
        let _ = self.tx.send(SinkEvent {
            name: event.to_string(),
            data: payload.to_string(),
        });
    }
}

/// Adapts an [`EventSink`] into a [`TokenSink`] bound to one event name.
pub struct EventTokenSink {
    sink: Arc<dyn EventSink>,
    event: &'static str,
}

impl EventTokenSink {
    pub fn new(sink: Arc<dyn EventSink>, event: &'static str) -> Self {
        Self { sink, event }
    }
}

impl TokenSink for EventTokenSink {
    fn accept(&self, token: &str) {
        self.sink.emit(self.event, token);
    }
}
