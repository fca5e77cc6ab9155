//! # mailforge-mime
//!
//! MIME tree composition for structured email.
//!
//! This crate turns a flat [`Mail`] description (sender, recipients, bodies,
//! alternatives, attachments, custom headers) into a well-formed hierarchical
//! MIME tree, ready to be serialized by an external assembler. It decides
//! multipart nesting so callers never hand-build boundaries:
//!
//! - `multipart/mixed` for independent attachments
//! - `multipart/alternative` for multiple body representations
//! - `multipart/related` for HTML bodies with inline `cid:` images
//!
//! Byte-level concerns (boundary generation, header folding, transfer
//! encoding, reading file/URL sources) are out of scope; the composed tree
//! references content sources without touching them.
//!
//! ## Quick Start
//!
//! ```
//! use mailforge_mime::{AttachmentSpec, Composer, Mail, Mailbox};
//!
//! # fn main() -> mailforge_mime::Result<()> {
//! let mail = Mail::builder()
//!     .from(Mailbox::new("sender@example.com")?)
//!     .to(Mailbox::new("recipient@example.com")?)
//!     .subject("Report")
//!     .text("See attached.")
//!     .html("<p>See attached.</p>")
//!     .attachment(AttachmentSpec::file("/tmp/report.pdf"))
//!     .build();
//!
//! let message = Composer::new(&mail).compose();
//! assert_eq!(message.root.content_type.to_string(), "multipart/mixed");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod compose;
mod content_type;
mod error;
mod header;
mod mail;
mod mimetype;
mod node;

pub mod resolve;

pub use compose::{Composer, derive_envelope};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use mail::{
    Address, AlternativeSpec, AttachmentSpec, ContentSource, Envelope, Mail, MailBuilder, Mailbox,
    TransferEncoding, XMailer,
};
pub use mimetype::{GuessLookup, MimeTypes};
pub use node::{ComposedMessage, Content, ContentNode};
pub use resolve::BodyOrder;
