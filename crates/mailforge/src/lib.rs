//! # mailforge
//!
//! Declarative email composition with a pluggable pipeline and transport
//! contract.
//!
//! A [`Mailer`] takes a flat [`Mail`] description, runs it through an ordered
//! compile pipeline, composes the MIME tree (via [`mailforge_mime`]), runs
//! the composed message through a send pipeline, and hands it to a
//! [`Transport`]. The in-memory [`StubTransport`] makes the whole flow
//! testable without network I/O.
//!
//! ## Quick Start
//!
//! ```
//! use mailforge::{Mail, Mailbox, Mailer, StubTransport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = Mailer::new(StubTransport::new())?;
//!
//! let mail = Mail::builder()
//!     .from(Mailbox::new("sender@example.com")?)
//!     .to(Mailbox::new("recipient@example.com")?)
//!     .subject("Hello")
//!     .text("Hello, World!")
//!     .build();
//!
//! let delivery = mailer.send(mail).await?;
//! assert_eq!(delivery.envelope.to, vec!["recipient@example.com"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline steps
//!
//! Cross-cutting concerns (header injection, signing, body rewriting) are
//! ordered [`Step`]s registered per stage:
//!
//! ```
//! use mailforge::{Mail, Mailer, StubTransport, SyncStep};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut mailer = Mailer::new(StubTransport::new())?;
//! mailer.use_compile(SyncStep(|mut mail: Mail| {
//!     mail.headers.push(("X-Campaign".to_string(), "spring".to_string()));
//!     Ok(mail)
//! }));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod mailer;
pub mod pipeline;
pub mod transport;

pub use error::{Error, Result};
pub use mailer::Mailer;
pub use pipeline::{Pipeline, SendContext, Step, StepError, SyncStep};
pub use transport::{
    Delivery, LogEntry, LogSink, MemorySink, StubTransport, TracingSink, Transport, TransportError,
};

// Re-export the composition core so callers need a single dependency
pub use mailforge_mime::{
    Address, AlternativeSpec, AttachmentSpec, BodyOrder, ComposedMessage, Composer, Content,
    ContentNode, ContentSource, ContentType, Envelope, GuessLookup, Headers, Mail, MailBuilder,
    Mailbox, MimeTypes, TransferEncoding, XMailer,
};
