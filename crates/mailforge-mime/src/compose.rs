//! MIME tree composition.
//!
//! [`Composer`] decides the multipart nesting shape from the counts and kinds
//! of alternatives and attachments, builds the node tree, and maps the mail
//! description's header fields onto the root node.
//!
//! The shape decision, evaluated once per message and in priority order:
//!
//! 1. `multipart/mixed` when detached attachments accompany other content
//! 2. `multipart/alternative` when more than one body representation exists
//! 3. `multipart/related` when an HTML body references content-id attachments
//! 4. a bare leaf otherwise
//!
//! Mixed always wins when real attachments are present: mail clients read
//! `multipart/mixed` as "independent parts", which is the correct semantic
//! for detached attachments, while `related`/`alternative` mark parts as
//! views of the same logical body.

use crate::content_type::ContentType;
use crate::header::Headers;
use crate::mail::{ContentSource, Envelope, Mail};
use crate::mimetype::{GuessLookup, MimeTypes};
use crate::node::{ComposedMessage, ContentNode};
use crate::resolve::{
    AlternativeSet, AttachmentGroups, BodyOrder, ResolvedPart, resolve_alternatives,
    resolve_attachments,
};

/// Composes a [`Mail`] description into a [`ComposedMessage`].
pub struct Composer<'a> {
    mail: &'a Mail,
    order: BodyOrder,
    lookup: &'a dyn MimeTypes,
}

impl<'a> Composer<'a> {
    /// Creates a composer with the default body order and content-type
    /// lookup.
    #[must_use]
    pub fn new(mail: &'a Mail) -> Self {
        Self {
            mail,
            order: BodyOrder::default(),
            lookup: &GuessLookup,
        }
    }

    /// Sets the ordering of the implicit text/HTML alternatives.
    #[must_use]
    pub const fn body_order(mut self, order: BodyOrder) -> Self {
        self.order = order;
        self
    }

    /// Replaces the content-type lookup collaborator.
    #[must_use]
    pub fn lookup(mut self, lookup: &'a dyn MimeTypes) -> Self {
        self.lookup = lookup;
        self
    }

    /// Builds the MIME tree and assembles the root headers and envelope.
    ///
    /// Every valid combination of alternatives and attachments produces a
    /// tree; a description with neither composes to a single empty
    /// `text/plain` leaf.
    #[must_use]
    pub fn compose(self) -> ComposedMessage {
        let alternatives = resolve_alternatives(self.mail, self.order, self.lookup);
        let attachments =
            resolve_attachments(self.mail, alternatives.html_index.is_some(), self.lookup);

        let shape = Shape {
            use_related: alternatives.html_index.is_some() && !attachments.related.is_empty(),
            use_alternative: alternatives.len() > 1,
            use_mixed: attachments.attached.len() > 1
                || (!alternatives.is_empty() && attachments.attached.len() == 1),
        };

        let mut root = self.build_root(&shape, &alternatives, &attachments);
        self.apply_headers(&mut root);

        let envelope = self
            .mail
            .envelope
            .clone()
            .unwrap_or_else(|| derive_envelope(self.mail));

        ComposedMessage { root, envelope }
    }

    fn build_root(
        &self,
        shape: &Shape,
        alternatives: &AlternativeSet,
        attachments: &AttachmentGroups,
    ) -> ContentNode {
        if shape.use_mixed {
            self.build_mixed(shape, alternatives, attachments)
        } else if shape.use_alternative {
            self.build_alternative(shape, alternatives, attachments)
        } else if shape.use_related {
            self.build_related(alternatives, attachments)
        } else {
            alternatives
                .parts
                .first()
                .or_else(|| attachments.attached.first())
                .map_or_else(
                    || {
                        ContentNode::leaf(ContentType::text_plain(), ContentSource::default())
                    },
                    |part| self.leaf(part),
                )
        }
    }

    fn build_mixed(
        &self,
        shape: &Shape,
        alternatives: &AlternativeSet,
        attachments: &AttachmentGroups,
    ) -> ContentNode {
        let mut node = ContentNode::container(ContentType::multipart_mixed());

        if shape.use_alternative {
            node.push(self.build_alternative(shape, alternatives, attachments));
        } else if shape.use_related {
            node.push(self.build_related(alternatives, attachments));
        } else {
            // A lone alternative not consumed by a subtree stays a direct child
            for part in &alternatives.parts {
                node.push(self.leaf(part));
            }
        }

        for part in &attachments.attached {
            node.push(self.leaf(part));
        }

        node
    }

    fn build_alternative(
        &self,
        shape: &Shape,
        alternatives: &AlternativeSet,
        attachments: &AttachmentGroups,
    ) -> ContentNode {
        let mut node = ContentNode::container(ContentType::multipart_alternative());

        for (index, part) in alternatives.parts.iter().enumerate() {
            if shape.use_related && alternatives.html_index == Some(index) {
                node.push(self.build_related(alternatives, attachments));
            } else {
                node.push(self.leaf(part));
            }
        }

        node
    }

    fn build_related(
        &self,
        alternatives: &AlternativeSet,
        attachments: &AttachmentGroups,
    ) -> ContentNode {
        let mut node = ContentNode::container(ContentType::multipart_related());

        if let Some(html) = alternatives.html_node() {
            node.push(self.leaf(html));
        }

        for part in &attachments.related {
            node.push(self.leaf(part));
        }

        node
    }

    fn leaf(&self, part: &ResolvedPart) -> ContentNode {
        let mut node = ContentNode::leaf(part.content_type.clone(), part.source.clone());
        node.filename = part.filename.clone();

        if let Some(cid) = &part.cid {
            node.headers.set("Content-Id", format!("<{cid}>"));
        }

        if let Some(encoding) = self.mail.encoding
            && part.content_type.is_text()
        {
            node.headers
                .set("Content-Transfer-Encoding", encoding.to_string());
        }

        node
    }

    /// Maps the mail description's header fields onto the root node.
    ///
    /// Absent or empty values are skipped, never emitted as empty headers.
    /// Custom headers are appended afterwards in insertion order, duplicate
    /// names allowed.
    fn apply_headers(&self, root: &mut ContentNode) {
        let headers = &mut root.headers;
        let mail = self.mail;

        if let Some(from) = &mail.from {
            headers.set("From", from.to_string());
        }
        set_mailbox_list(headers, "To", &mail.to);
        set_mailbox_list(headers, "Cc", &mail.cc);
        set_mailbox_list(headers, "Bcc", &mail.bcc);
        if let Some(reply_to) = &mail.reply_to {
            headers.set("Reply-To", reply_to.to_string());
        }
        set_nonempty(headers, "In-Reply-To", mail.in_reply_to.as_deref());
        set_nonempty(headers, "References", mail.references.as_deref());
        set_nonempty(headers, "Subject", mail.subject.as_deref());
        set_nonempty(headers, "Message-Id", mail.message_id.as_deref());
        if let Some(date) = &mail.date {
            headers.set("Date", date.to_rfc2822());
        }

        for (name, value) in &mail.headers {
            headers.add(name.clone(), value.clone());
        }
    }
}

struct Shape {
    use_related: bool,
    use_alternative: bool,
    use_mixed: bool,
}

fn set_mailbox_list(headers: &mut Headers, name: &str, mailboxes: &[crate::mail::Mailbox]) {
    if mailboxes.is_empty() {
        return;
    }
    let value = mailboxes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    headers.set(name, value);
}

fn set_nonempty(headers: &mut Headers, name: &str, value: Option<&str>) {
    if let Some(value) = value
        && !value.is_empty()
    {
        headers.set(name, value);
    }
}

/// Derives the delivery envelope from the visible header fields.
///
/// Recipients are collected from To, Cc and Bcc in declaration order,
/// duplicates removed.
#[must_use]
pub fn derive_envelope(mail: &Mail) -> Envelope {
    let mut to = Vec::new();
    for mailbox in mail.to.iter().chain(&mail.cc).chain(&mail.bcc) {
        let addr = mailbox.address.as_str();
        if !to.iter().any(|existing: &String| existing == addr) {
            to.push(addr.to_string());
        }
    }

    Envelope {
        from: mail.from.as_ref().map(|m| m.address.as_str().to_string()),
        to,
    }
}
