//! Mail description types.
//!
//! A [`Mail`] is the flat, caller-facing description of a message: header
//! fields, bodies, alternatives, attachments and overrides. It is consumed
//! once per send and turned into a [`ComposedMessage`](crate::ComposedMessage)
//! by the composer.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates an email address (basic validation).
    fn validate(addr: &str) -> Result<()> {
        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::InvalidAddress(format!("'{addr}' must contain @")));
        };

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(Error::InvalidAddress(format!(
                "'{addr}' must have non-empty local and domain parts"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mailbox (optional display name + address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name (optional).
    pub name: Option<String>,
    /// Email address.
    pub address: Address,
}

impl Mailbox {
    /// Creates a new mailbox with just an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(address: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: None,
            address: Address::new(address)?,
        })
    }

    /// Creates a new mailbox with a display name and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: Some(name.into()),
            address: Address::new(address)?,
        })
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Transfer encoding for textual leaf parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Where a part's content comes from.
///
/// The composer never reads the content; file paths and URLs are handed to
/// the serializing assembler as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Content supplied inline as bytes.
    Inline(Vec<u8>),
    /// Content to be read from a file path at serialization time.
    File(PathBuf),
    /// Content to be fetched from a URL at serialization time.
    Url(String),
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::Inline(Vec::new())
    }
}

impl From<&str> for ContentSource {
    fn from(value: &str) -> Self {
        Self::Inline(value.as_bytes().to_vec())
    }
}

impl From<String> for ContentSource {
    fn from(value: String) -> Self {
        Self::Inline(value.into_bytes())
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Inline(value)
    }
}

/// Declaration of a file attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSpec {
    /// Explicit content type; inferred from the filename otherwise.
    pub content_type: Option<String>,
    /// Explicit filename; inferred from the source otherwise.
    pub filename: Option<String>,
    /// Content-id enabling inline `cid:` references from an HTML body.
    pub cid: Option<String>,
    /// Content source.
    pub source: ContentSource,
}

impl AttachmentSpec {
    /// Creates an attachment from inline content.
    #[must_use]
    pub fn inline(content: impl Into<ContentSource>) -> Self {
        Self {
            source: content.into(),
            ..Self::default()
        }
    }

    /// Creates an attachment read from a file path at serialization time.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ContentSource::File(path.into()),
            ..Self::default()
        }
    }

    /// Creates an attachment fetched from a URL at serialization time.
    #[must_use]
    pub fn url(href: impl Into<String>) -> Self {
        Self {
            source: ContentSource::Url(href.into()),
            ..Self::default()
        }
    }

    /// Sets an explicit content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets an explicit filename.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the content-id for inline referencing.
    #[must_use]
    pub fn cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }
}

/// Declaration of an additional body alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlternativeSpec {
    /// Explicit content type; inferred from the filename otherwise.
    pub content_type: Option<String>,
    /// Explicit filename.
    pub filename: Option<String>,
    /// Content source.
    pub source: ContentSource,
}

impl AlternativeSpec {
    /// Creates an alternative from inline content.
    #[must_use]
    pub fn inline(content: impl Into<ContentSource>) -> Self {
        Self {
            source: content.into(),
            ..Self::default()
        }
    }

    /// Creates an alternative read from a file path at serialization time.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ContentSource::File(path.into()),
            ..Self::default()
        }
    }

    /// Creates an alternative fetched from a URL at serialization time.
    #[must_use]
    pub fn url(href: impl Into<String>) -> Self {
        Self {
            source: ContentSource::Url(href.into()),
            ..Self::default()
        }
    }

    /// Sets an explicit content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets an explicit filename.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Delivery-level sender and recipients, distinct from the visible headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope sender address.
    pub from: Option<String>,
    /// Envelope recipient addresses, in declaration order.
    pub to: Vec<String>,
}

/// X-Mailer header behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum XMailer {
    /// Emit the default versioned signature.
    #[default]
    Default,
    /// Suppress the header entirely.
    Disabled,
    /// Emit a caller-supplied value.
    Custom(String),
}

/// Flat description of an email message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mail {
    /// Sender shown in the From header.
    pub from: Option<Mailbox>,
    /// Primary recipients.
    pub to: Vec<Mailbox>,
    /// Carbon-copy recipients.
    pub cc: Vec<Mailbox>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<Mailbox>,
    /// Reply-To mailbox.
    pub reply_to: Option<Mailbox>,
    /// In-Reply-To message id.
    pub in_reply_to: Option<String>,
    /// References header value.
    pub references: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Explicit Message-Id.
    pub message_id: Option<String>,
    /// Date header value.
    pub date: Option<DateTime<Utc>>,
    /// Custom headers, order-preserving, duplicate names allowed.
    pub headers: Vec<(String, String)>,
    /// Plain-text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Additional body alternatives, in order.
    pub alternatives: Vec<AlternativeSpec>,
    /// Attachments, in order.
    pub attachments: Vec<AttachmentSpec>,
    /// Content-transfer-encoding override for textual parts.
    pub encoding: Option<TransferEncoding>,
    /// Envelope override.
    pub envelope: Option<Envelope>,
    /// X-Mailer header behavior.
    pub xmailer: XMailer,
}

impl Mail {
    /// Creates a builder for a mail description.
    #[must_use]
    pub fn builder() -> MailBuilder {
        MailBuilder::default()
    }
}

/// Builder for [`Mail`].
#[derive(Debug, Default)]
pub struct MailBuilder {
    mail: Mail,
}

impl MailBuilder {
    /// Sets the From mailbox.
    #[must_use]
    pub fn from(mut self, from: Mailbox) -> Self {
        self.mail.from = Some(from);
        self
    }

    /// Adds a To recipient.
    #[must_use]
    pub fn to(mut self, to: Mailbox) -> Self {
        self.mail.to.push(to);
        self
    }

    /// Adds a Cc recipient.
    #[must_use]
    pub fn cc(mut self, cc: Mailbox) -> Self {
        self.mail.cc.push(cc);
        self
    }

    /// Adds a Bcc recipient.
    #[must_use]
    pub fn bcc(mut self, bcc: Mailbox) -> Self {
        self.mail.bcc.push(bcc);
        self
    }

    /// Sets the Reply-To mailbox.
    #[must_use]
    pub fn reply_to(mut self, reply_to: Mailbox) -> Self {
        self.mail.reply_to = Some(reply_to);
        self
    }

    /// Sets the In-Reply-To message id.
    #[must_use]
    pub fn in_reply_to(mut self, id: impl Into<String>) -> Self {
        self.mail.in_reply_to = Some(id.into());
        self
    }

    /// Sets the References header value.
    #[must_use]
    pub fn references(mut self, refs: impl Into<String>) -> Self {
        self.mail.references = Some(refs.into());
        self
    }

    /// Sets the subject line.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.mail.subject = Some(subject.into());
        self
    }

    /// Sets an explicit Message-Id.
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.mail.message_id = Some(id.into());
        self
    }

    /// Sets the Date header.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.mail.date = Some(date);
        self
    }

    /// Adds a custom header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.mail.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.mail.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.mail.html = Some(html.into());
        self
    }

    /// Adds a body alternative.
    #[must_use]
    pub fn alternative(mut self, alternative: AlternativeSpec) -> Self {
        self.mail.alternatives.push(alternative);
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attachment(mut self, attachment: AttachmentSpec) -> Self {
        self.mail.attachments.push(attachment);
        self
    }

    /// Sets the transfer-encoding override for textual parts.
    #[must_use]
    pub const fn encoding(mut self, encoding: TransferEncoding) -> Self {
        self.mail.encoding = Some(encoding);
        self
    }

    /// Sets the envelope override.
    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.mail.envelope = Some(envelope);
        self
    }

    /// Sets the X-Mailer header behavior.
    #[must_use]
    pub fn xmailer(mut self, xmailer: XMailer) -> Self {
        self.mail.xmailer = xmailer;
        self
    }

    /// Builds the mail description.
    #[must_use]
    pub fn build(self) -> Mail {
        self.mail
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_validation() {
        assert!(Address::new("user@example.com").is_ok());
        assert!(Address::new("no-at-sign").is_err());
        assert!(Address::new("@example.com").is_err());
        assert!(Address::new("user@").is_err());
        assert!(Address::new("a@b@c").is_err());
    }

    #[test]
    fn test_mailbox_display() {
        let plain = Mailbox::new("user@example.com").unwrap();
        assert_eq!(plain.to_string(), "user@example.com");

        let named = Mailbox::with_name("Alice", "alice@example.com").unwrap();
        assert_eq!(named.to_string(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_transfer_encoding_roundtrip() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(
            TransferEncoding::parse("Quoted-Printable"),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(
            TransferEncoding::QuotedPrintable.to_string(),
            "quoted-printable"
        );
    }

    #[test]
    fn test_builder() {
        let mail = Mail::builder()
            .from(Mailbox::new("sender@example.com").unwrap())
            .to(Mailbox::new("rcpt@example.com").unwrap())
            .subject("Hello")
            .text("hi")
            .header("X-Tag", "one")
            .header("X-Tag", "two")
            .build();

        assert_eq!(mail.subject.as_deref(), Some("Hello"));
        assert_eq!(mail.headers.len(), 2);
        assert_eq!(mail.xmailer, XMailer::Default);
    }

    #[test]
    fn test_content_source_default_is_empty_inline() {
        assert_eq!(ContentSource::default(), ContentSource::Inline(Vec::new()));
    }
}
