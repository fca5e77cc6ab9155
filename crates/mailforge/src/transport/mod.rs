//! Transport contract.
//!
//! A transport is the delivery mechanism a composed message is handed to.
//! The core never retries and never reaches into serialization; it forwards
//! the transport's structured log entries to the mailer's sink and surfaces
//! failures verbatim.

mod stub;

pub use stub::{MemorySink, StubTransport};

use async_trait::async_trait;
use mailforge_mime::{ComposedMessage, Envelope};
use tracing::debug;

/// A structured log line emitted during delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Entry kind (e.g. "envelope", "message").
    pub kind: String,
    /// Entry text.
    pub text: String,
}

impl LogEntry {
    /// Creates a log entry.
    #[must_use]
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// Capability receiving transport log entries.
///
/// Replaces an event-emitter surface: the mailer passes its sink to the
/// transport for the duration of a send, and transports call
/// [`notify`](LogSink::notify) per emitted line.
pub trait LogSink: Send + Sync {
    /// Receives one log entry.
    fn notify(&self, entry: LogEntry);
}

/// Default sink forwarding entries to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn notify(&self, entry: LogEntry) {
        debug!(kind = %entry.kind, "{}", entry.text);
    }
}

/// Errors reported by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connecting to the delivery backend failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend rejected or failed to deliver the message.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The envelope the message was delivered with.
    pub envelope: Envelope,
    /// Backend response payload, transport-specific.
    pub response: Vec<u8>,
}

/// A delivery mechanism for composed messages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name, used in the X-Mailer signature.
    fn name(&self) -> &str;

    /// Transport version, used in the X-Mailer signature.
    fn version(&self) -> &str;

    /// Delivers a composed message.
    ///
    /// Log entries go to `sink`; the call runs to completion or failure,
    /// with no cancellation and no retries at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error when delivery fails; the caller receives it verbatim.
    async fn send(
        &self,
        message: &ComposedMessage,
        sink: &dyn LogSink,
    ) -> Result<Delivery, TransportError>;
}
