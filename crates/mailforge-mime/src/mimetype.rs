//! Content-type/extension lookup collaborator.
//!
//! Resolution treats the lookup as authoritative and side-effect-free; the
//! default implementation is backed by `mime_guess`.

/// Lookup between file names and MIME content types.
pub trait MimeTypes: Send + Sync {
    /// Detects the content type for a file name, path, or URL.
    ///
    /// Returns `None` when the extension is unknown; callers apply their own
    /// fallback.
    fn detect_mime_type(&self, name: &str) -> Option<String>;

    /// Detects the canonical file extension for a content type.
    fn detect_extension(&self, content_type: &str) -> Option<String>;
}

/// Default [`MimeTypes`] implementation over the `mime_guess` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessLookup;

impl MimeTypes for GuessLookup {
    fn detect_mime_type(&self, name: &str) -> Option<String> {
        mime_guess::from_path(name).first().map(|m| m.to_string())
    }

    fn detect_extension(&self, content_type: &str) -> Option<String> {
        // Parameters are irrelevant to the extension table
        let essence = content_type.split(';').next().unwrap_or(content_type).trim();
        mime_guess::get_mime_extensions_str(essence)
            .and_then(|exts| exts.first())
            .map(|ext| (*ext).to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mime_type_from_extension() {
        let lookup = GuessLookup;
        assert_eq!(
            lookup.detect_mime_type("photo.png").as_deref(),
            Some("image/png")
        );
        assert_eq!(
            lookup.detect_mime_type("/tmp/report.pdf").as_deref(),
            Some("application/pdf")
        );
    }

    #[test]
    fn test_detect_mime_type_unknown() {
        let lookup = GuessLookup;
        assert_eq!(lookup.detect_mime_type("archive.unknownext"), None);
        assert_eq!(lookup.detect_mime_type("noextension"), None);
    }

    #[test]
    fn test_detect_extension_ignores_parameters() {
        let lookup = GuessLookup;
        let ext = lookup
            .detect_extension("text/html; charset=utf-8")
            .unwrap();
        assert!(ext == "html" || ext == "htm");
    }
}
