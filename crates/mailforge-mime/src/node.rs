//! Composed message tree.

use crate::content_type::ContentType;
use crate::header::Headers;
use crate::mail::{ContentSource, Envelope};

/// Content carried by a [`ContentNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Multipart container; the content lives in the children.
    Container,
    /// Leaf content source, attached untouched.
    Source(ContentSource),
}

/// A node in the composed MIME tree.
///
/// Invariant: a node with children has a multipart content type and
/// [`Content::Container`]; a leaf node carries exactly one content source.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    /// Content type with parameters.
    pub content_type: ContentType,
    /// Suggested filename, for attachment leaves.
    pub filename: Option<String>,
    /// Node-level headers (content-id, transfer encoding, custom).
    pub headers: Headers,
    /// Node content.
    pub content: Content,
    /// Child nodes, in order. Empty for leaves.
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Creates a multipart container node.
    #[must_use]
    pub fn container(content_type: ContentType) -> Self {
        Self {
            content_type,
            filename: None,
            headers: Headers::new(),
            content: Content::Container,
            children: Vec::new(),
        }
    }

    /// Creates a leaf node with a content source.
    #[must_use]
    pub fn leaf(content_type: ContentType, source: ContentSource) -> Self {
        Self {
            content_type,
            filename: None,
            headers: Headers::new(),
            content: Content::Source(source),
            children: Vec::new(),
        }
    }

    /// Appends a child node.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Checks whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Checks whether this node has a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.content_type.is_multipart()
    }

    /// Collects all leaf nodes in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }
}

/// A fully composed message: the MIME tree plus the delivery envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMessage {
    /// Root node of the MIME tree; root-level headers live here.
    pub root: ContentNode,
    /// Delivery envelope.
    pub envelope: Envelope,
}
