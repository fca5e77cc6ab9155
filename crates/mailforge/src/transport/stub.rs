//! Deterministic in-memory transport for testing.

use super::{Delivery, LogEntry, LogSink, Transport, TransportError};
use async_trait::async_trait;
use mailforge_mime::{ComposedMessage, Content, ContentSource};
use std::sync::Mutex;

/// In-memory transport that buffers message content instead of delivering.
///
/// Each send emits one `envelope` log entry, then one `message` entry per
/// leaf chunk, and resolves with the buffered inline bytes. File and URL
/// sources are logged by reference since the core performs no I/O.
///
/// In error mode ([`StubTransport::failing`]) the transport never reads the
/// message: it yields to the scheduler once and fails, which exercises
/// failure propagation without real I/O.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    failure: Option<String>,
}

impl StubTransport {
    /// Creates a stub that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub that fails every send with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &str {
        "Stub"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn send(
        &self,
        message: &ComposedMessage,
        sink: &dyn LogSink,
    ) -> Result<Delivery, TransportError> {
        if let Some(failure) = &self.failure {
            // Fail on the next scheduling tick, without touching the message
            tokio::task::yield_now().await;
            return Err(TransportError::Delivery(failure.clone()));
        }

        let envelope = &message.envelope;
        sink.notify(LogEntry::new(
            "envelope",
            format!(
                "from=<{}> to=[{}]",
                envelope.from.as_deref().unwrap_or(""),
                envelope.to.join(", ")
            ),
        ));

        let mut response = Vec::new();
        for leaf in message.root.leaves() {
            let Content::Source(source) = &leaf.content else {
                continue;
            };
            match source {
                ContentSource::Inline(bytes) => {
                    response.extend_from_slice(bytes);
                    sink.notify(LogEntry::new(
                        "message",
                        String::from_utf8_lossy(bytes).into_owned(),
                    ));
                }
                ContentSource::File(path) => {
                    sink.notify(LogEntry::new(
                        "message",
                        format!("[file {}]", path.display()),
                    ));
                }
                ContentSource::Url(href) => {
                    sink.notify(LogEntry::new("message", format!("[url {href}]")));
                }
            }
        }

        Ok(Delivery {
            envelope: envelope.clone(),
            response,
        })
    }
}

/// Log sink capturing entries in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the captured entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock was poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn notify(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailforge_mime::{AttachmentSpec, Composer, Mail, Mailbox};

    #[tokio::test]
    async fn test_stub_buffers_inline_content() {
        let mail = Mail::builder()
            .from(Mailbox::new("a@example.com").unwrap())
            .to(Mailbox::new("b@example.com").unwrap())
            .text("hello stub")
            .build();
        let message = Composer::new(&mail).compose();

        let sink = MemorySink::new();
        let delivery = StubTransport::new().send(&message, &sink).await.unwrap();

        assert_eq!(delivery.response, b"hello stub");
        assert_eq!(delivery.envelope.to, vec!["b@example.com"]);

        let entries = sink.entries();
        assert_eq!(entries[0].kind, "envelope");
        assert!(entries[0].text.contains("from=<a@example.com>"));
        assert_eq!(entries[1].kind, "message");
        assert_eq!(entries[1].text, "hello stub");
    }

    #[tokio::test]
    async fn test_stub_logs_file_sources_by_reference() {
        let mail = Mail::builder()
            .text("body")
            .attachment(AttachmentSpec::file("/tmp/a.png"))
            .build();
        let message = Composer::new(&mail).compose();

        let sink = MemorySink::new();
        let delivery = StubTransport::new().send(&message, &sink).await.unwrap();

        // Only inline bytes land in the buffer
        assert_eq!(delivery.response, b"body");
        let texts: Vec<_> = sink.entries().into_iter().map(|e| e.text).collect();
        assert!(texts.iter().any(|t| t == "[file /tmp/a.png]"));
    }

    #[tokio::test]
    async fn test_failing_stub_never_reads_content() {
        let mail = Mail::builder().text("never read").build();
        let message = Composer::new(&mail).compose();

        let sink = MemorySink::new();
        let err = StubTransport::failing("refused")
            .send(&message, &sink)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Delivery(ref m) if m == "refused"));
        assert!(sink.entries().is_empty());
    }
}
