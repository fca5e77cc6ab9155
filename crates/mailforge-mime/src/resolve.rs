//! Attachment and alternative resolution.
//!
//! Turns raw [`AttachmentSpec`]/[`AlternativeSpec`] declarations into
//! normalized parts with a concrete content type, filename and content
//! source. Resolution is best-effort and never fails: anything the lookup
//! cannot identify falls back to `application/octet-stream` for attachments
//! and `text/plain` for alternatives.

use crate::content_type::ContentType;
use crate::mail::{AlternativeSpec, AttachmentSpec, ContentSource, Mail};
use crate::mimetype::MimeTypes;

/// Ordering of the implicit text/HTML body alternatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyOrder {
    /// Plain text first, then HTML.
    #[default]
    TextFirst,
    /// HTML first, then plain text.
    HtmlFirst,
}

/// A normalized part ready to become a leaf node.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPart {
    /// Resolved content type.
    pub content_type: ContentType,
    /// Resolved filename, always present for attachments.
    pub filename: Option<String>,
    /// Sanitized content-id, without protecting angle brackets.
    pub cid: Option<String>,
    /// Content source, untouched apart from URL reclassification.
    pub source: ContentSource,
}

/// Attachments split by whether they carry a content-id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentGroups {
    /// Attachments without a content-id (or all of them when no HTML body
    /// exists).
    pub attached: Vec<ResolvedPart>,
    /// Content-id attachments destined for a `multipart/related` subtree.
    pub related: Vec<ResolvedPart>,
}

/// The ordered body alternatives of a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlternativeSet {
    /// Alternatives in presentation order.
    pub parts: Vec<ResolvedPart>,
    /// Index of the designated HTML alternative, if any. When several
    /// alternatives claim `text/html`, the last one wins.
    pub html_index: Option<usize>,
}

impl AlternativeSet {
    /// Returns the designated HTML alternative, if any.
    #[must_use]
    pub fn html_node(&self) -> Option<&ResolvedPart> {
        self.html_index.map(|i| &self.parts[i])
    }

    /// Number of alternatives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Checks whether there are no alternatives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Strips protecting angle brackets from a content-id.
#[must_use]
pub fn sanitize_cid(cid: &str) -> String {
    cid.chars().filter(|c| *c != '<' && *c != '>').collect()
}

fn is_http_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reclassifies a file path that is actually an absolute HTTP(S) URL.
///
/// This runs before any filename or content-type inference so extension
/// lookup still sees the URL.
fn reclassify(source: &ContentSource) -> ContentSource {
    match source {
        ContentSource::File(path) => {
            let text = path.to_string_lossy();
            if is_http_url(&text) {
                ContentSource::Url(text.into_owned())
            } else {
                source.clone()
            }
        }
        _ => source.clone(),
    }
}

/// The path or URL string a filename and content type can be inferred from.
fn source_hint(source: &ContentSource) -> Option<String> {
    match source {
        ContentSource::File(path) => Some(path.to_string_lossy().into_owned()),
        ContentSource::Url(href) => Some(href.clone()),
        ContentSource::Inline(_) => None,
    }
}

fn detect(lookup: &dyn MimeTypes, hint: Option<&str>) -> Option<ContentType> {
    hint.and_then(|h| lookup.detect_mime_type(h))
        .and_then(|ct| ContentType::parse(&ct).ok())
}

fn last_segment(hint: &str) -> Option<&str> {
    hint.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Resolves all attachments of a mail description.
///
/// When `find_related` is set (an HTML alternative exists), attachments
/// carrying a content-id are split into the `related` group; otherwise every
/// attachment lands in `attached`.
#[must_use]
pub fn resolve_attachments(
    mail: &Mail,
    find_related: bool,
    lookup: &dyn MimeTypes,
) -> AttachmentGroups {
    let mut groups = AttachmentGroups::default();

    for (index, spec) in mail.attachments.iter().enumerate() {
        let part = resolve_attachment(spec, index, lookup);
        if find_related && part.cid.is_some() {
            groups.related.push(part);
        } else {
            groups.attached.push(part);
        }
    }

    groups
}

fn resolve_attachment(spec: &AttachmentSpec, index: usize, lookup: &dyn MimeTypes) -> ResolvedPart {
    let source = reclassify(&spec.source);
    let hint = source_hint(&source);

    let content_type = spec
        .content_type
        .as_deref()
        .and_then(|ct| ContentType::parse(ct).ok())
        .or_else(|| {
            let name = spec.filename.as_deref().or(hint.as_deref());
            detect(lookup, name)
        })
        .unwrap_or_else(ContentType::application_octet_stream);

    let mut filename = spec.filename.clone().unwrap_or_else(|| {
        hint.as_deref()
            .and_then(last_segment)
            .map_or_else(|| format!("attachment-{}", index + 1), String::from)
    });
    if !filename.contains('.') {
        let ext = lookup
            .detect_extension(&content_type.to_string())
            .unwrap_or_else(|| "bin".to_string());
        filename.push('.');
        filename.push_str(&ext);
    }

    ResolvedPart {
        content_type,
        filename: Some(filename),
        cid: spec.cid.as_deref().map(sanitize_cid),
        source,
    }
}

/// Resolves the ordered body alternatives of a mail description.
///
/// The implicit `text`/`html` bodies come first in the configured order,
/// followed by explicit alternatives in declaration order.
#[must_use]
pub fn resolve_alternatives(
    mail: &Mail,
    order: BodyOrder,
    lookup: &dyn MimeTypes,
) -> AlternativeSet {
    let mut parts = Vec::new();

    let text = mail.text.as_ref().map(|text| ResolvedPart {
        content_type: ContentType::text_plain(),
        filename: None,
        cid: None,
        source: ContentSource::from(text.clone()),
    });
    let html = mail.html.as_ref().map(|html| ResolvedPart {
        content_type: ContentType::text_html(),
        filename: None,
        cid: None,
        source: ContentSource::from(html.clone()),
    });

    match order {
        BodyOrder::TextFirst => {
            parts.extend(text);
            parts.extend(html);
        }
        BodyOrder::HtmlFirst => {
            parts.extend(html);
            parts.extend(text);
        }
    }

    for spec in &mail.alternatives {
        parts.push(resolve_alternative(spec, lookup));
    }

    let html_index = parts.iter().rposition(|part| part.content_type.is_html());

    AlternativeSet { parts, html_index }
}

fn resolve_alternative(spec: &AlternativeSpec, lookup: &dyn MimeTypes) -> ResolvedPart {
    let source = reclassify(&spec.source);
    let hint = source_hint(&source);

    let content_type = spec
        .content_type
        .as_deref()
        .and_then(|ct| ContentType::parse(ct).ok())
        .or_else(|| {
            let name = spec.filename.as_deref().or(hint.as_deref());
            detect(lookup, name)
        })
        .unwrap_or_else(ContentType::text_plain);

    ResolvedPart {
        content_type,
        filename: spec.filename.clone(),
        cid: None,
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mimetype::GuessLookup;
    use proptest::prelude::*;

    fn mail_with_attachments(attachments: Vec<AttachmentSpec>) -> Mail {
        Mail {
            attachments,
            ..Mail::default()
        }
    }

    #[test]
    fn test_content_type_from_file_extension() {
        let mail = mail_with_attachments(vec![AttachmentSpec::file("/tmp/photo.png")]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);

        let part = &groups.attached[0];
        assert_eq!(part.content_type.to_string(), "image/png");
        assert_eq!(part.filename.as_deref(), Some("photo.png"));
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let mail = mail_with_attachments(vec![
            AttachmentSpec::file("/tmp/photo.png").content_type("application/x-custom"),
        ]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);
        assert_eq!(
            groups.attached[0].content_type.to_string(),
            "application/x-custom"
        );
    }

    #[test]
    fn test_unparseable_explicit_content_type_falls_back() {
        let mail = mail_with_attachments(vec![AttachmentSpec::inline("x").content_type("junk")]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);
        assert_eq!(
            groups.attached[0].content_type.to_string(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_synthesized_filename_with_extension() {
        let mail = mail_with_attachments(vec![
            AttachmentSpec::inline("data").content_type("text/plain"),
        ]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);
        let filename = groups.attached[0].filename.clone().unwrap();
        assert!(filename.starts_with("attachment-1."));
    }

    #[test]
    fn test_synthesized_filename_uses_one_based_index() {
        let mail = mail_with_attachments(vec![
            AttachmentSpec::file("/tmp/a.txt"),
            AttachmentSpec::inline("data"),
        ]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);
        let filename = groups.attached[1].filename.clone().unwrap();
        assert!(filename.starts_with("attachment-2."));
    }

    #[test]
    fn test_http_path_reclassified_as_url() {
        let mail = mail_with_attachments(vec![AttachmentSpec::file(
            "https://example.com/files/logo.png",
        )]);
        let groups = resolve_attachments(&mail, false, &GuessLookup);

        let part = &groups.attached[0];
        assert_eq!(
            part.source,
            ContentSource::Url("https://example.com/files/logo.png".to_string())
        );
        // Extension lookup still sees the URL
        assert_eq!(part.content_type.to_string(), "image/png");
        assert_eq!(part.filename.as_deref(), Some("logo.png"));
    }

    #[test]
    fn test_related_split_requires_html() {
        let specs = vec![
            AttachmentSpec::file("/tmp/x.png").cid("x"),
            AttachmentSpec::file("/tmp/y.png"),
        ];

        let groups = resolve_attachments(&mail_with_attachments(specs.clone()), true, &GuessLookup);
        assert_eq!(groups.related.len(), 1);
        assert_eq!(groups.attached.len(), 1);

        let groups = resolve_attachments(&mail_with_attachments(specs), false, &GuessLookup);
        assert!(groups.related.is_empty());
        assert_eq!(groups.attached.len(), 2);
    }

    #[test]
    fn test_alternatives_text_first_order() {
        let mail = Mail {
            text: Some("hi".to_string()),
            html: Some("<p>hi</p>".to_string()),
            ..Mail::default()
        };

        let set = resolve_alternatives(&mail, BodyOrder::TextFirst, &GuessLookup);
        assert_eq!(set.len(), 2);
        assert!(set.parts[0].content_type.is_text());
        assert!(set.parts[1].content_type.is_html());
        assert_eq!(set.html_index, Some(1));

        let set = resolve_alternatives(&mail, BodyOrder::HtmlFirst, &GuessLookup);
        assert!(set.parts[0].content_type.is_html());
        assert_eq!(set.html_index, Some(0));
    }

    #[test]
    fn test_last_html_alternative_is_designated() {
        let mail = Mail {
            html: Some("<p>first</p>".to_string()),
            alternatives: vec![
                AlternativeSpec::inline("<p>second</p>").content_type("text/html"),
            ],
            ..Mail::default()
        };

        let set = resolve_alternatives(&mail, BodyOrder::TextFirst, &GuessLookup);
        assert_eq!(set.html_index, Some(1));
        assert_eq!(
            set.html_node().unwrap().source,
            ContentSource::from("<p>second</p>")
        );
    }

    #[test]
    fn test_alternative_fallback_is_text_plain() {
        let mail = Mail {
            alternatives: vec![AlternativeSpec::inline("raw")],
            ..Mail::default()
        };
        let set = resolve_alternatives(&mail, BodyOrder::TextFirst, &GuessLookup);
        assert_eq!(set.parts[0].content_type.to_string(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mail = mail_with_attachments(vec![
            AttachmentSpec::file("/tmp/a.png").cid("<img@local>"),
            AttachmentSpec::url("https://example.com/doc.pdf"),
            AttachmentSpec::inline("raw"),
        ]);

        let first = resolve_attachments(&mail, true, &GuessLookup);
        let second = resolve_attachments(&mail, true, &GuessLookup);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cid_sanitization() {
        assert_eq!(sanitize_cid("<foo@bar>"), "foo@bar");
        assert_eq!(sanitize_cid("foo@bar"), "foo@bar");
    }

    proptest! {
        #[test]
        fn prop_sanitize_cid_roundtrips_through_wrapping(cid in "[a-zA-Z0-9@.<>-]{0,32}") {
            let stripped = sanitize_cid(&cid);
            let wrapped = format!("<{stripped}>");
            prop_assert_eq!(sanitize_cid(&wrapped), stripped);
        }
    }
}
