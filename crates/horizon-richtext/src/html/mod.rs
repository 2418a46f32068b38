//! HTML import and export.
//!
//! [`HtmlCodec`] maps a [`StyledDocument`] to a small, fixed HTML vocabulary
//! and back. Documents built from the editing operations survive
//! `import(export(doc))` unchanged.
//!
//! # Example
//!
//! ```
//! use horizon_richtext::{Color, HtmlCodec, StyledDocument};
//! use horizon_richtext::format::AttributePatch;
//!
//! let mut doc = StyledDocument::from_text("Hi");
//! doc.set_attributes(0..2, &AttributePatch::new().bold(true).foreground_color(Some(Color::RED)))
//!     .unwrap();
//!
//! let codec = HtmlCodec::new();
//! let html = codec.export(&doc);
//! assert_eq!(html, "<p><span style=\"color:red;\"><b>Hi</b></span></p>");
//! assert_eq!(codec.import(&html), doc);
//! ```

mod css;
mod export;
mod import;

use horizon_richtext_core::PerfSpan;
use horizon_richtext_core::logging::{span_names, targets};

use crate::document::StyledDocument;
use crate::error::ParseError;

/// Default first-line indent written for `text-indent`, in pixels.
pub const DEFAULT_INDENTATION_SIZE: f32 = 15.0;

/// Converts between styled documents and HTML.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtmlCodec {
    indentation_size: f32,
}

impl Default for HtmlCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlCodec {
    /// Create a codec with the default indentation size.
    pub fn new() -> Self {
        Self {
            indentation_size: DEFAULT_INDENTATION_SIZE,
        }
    }

    /// Set the width written for a first-line indent.
    pub fn with_indentation_size(mut self, size: f32) -> Self {
        self.indentation_size = size;
        self
    }

    /// The width written for a first-line indent.
    pub fn indentation_size(&self) -> f32 {
        self.indentation_size
    }

    /// Serialize a document.
    pub fn export(&self, doc: &StyledDocument) -> String {
        let _span = PerfSpan::new(span_names::HTML_EXPORT);
        let html = export::export_document(doc, self.indentation_size);
        tracing::debug!(
            target: targets::HTML,
            runs = doc.runs().len(),
            bytes = html.len(),
            "exported HTML"
        );
        html
    }

    /// Parse HTML, reporting malformed markup.
    pub fn try_import(&self, html: &str) -> Result<StyledDocument, ParseError> {
        let _span = PerfSpan::new(span_names::HTML_IMPORT);
        let doc = import::import_document(html)?;
        tracing::debug!(
            target: targets::HTML,
            chars = doc.len(),
            runs = doc.runs().len(),
            "imported HTML"
        );
        Ok(doc)
    }

    /// Parse HTML, falling back to its visible text as unstyled content when
    /// the markup is malformed.
    pub fn import(&self, html: &str) -> StyledDocument {
        match self.try_import(html) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    target: targets::HTML,
                    error = %err,
                    "malformed HTML, importing as plain text"
                );
                StyledDocument::from_text(&import::visible_text(html))
            }
        }
    }
}

/// Serialize a document with the default codec.
pub fn export_html(doc: &StyledDocument) -> String {
    HtmlCodec::new().export(doc)
}

/// Parse HTML with the default codec, falling back to plain text.
pub fn import_html(html: &str) -> StyledDocument {
    HtmlCodec::new().import(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AttributePatch;

    #[test]
    fn test_import_falls_back_to_plain_text() {
        let doc = import_html("<b>unclosed <i>tags");
        assert_eq!(doc.text(), "unclosed tags");
        assert_eq!(doc.runs().len(), 1);
        assert!(!doc.runs()[0].attributes.is_styled());
    }

    #[test]
    fn test_try_import_reports_error() {
        let err = HtmlCodec::new().try_import("<p>x</b>").unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_indentation_size_is_used() {
        let mut doc = StyledDocument::from_text("x");
        doc.set_attributes(0..1, &AttributePatch::new().first_line_indent(true))
            .unwrap();
        let codec = HtmlCodec::new().with_indentation_size(24.0);
        assert_eq!(codec.export(&doc), "<p style=\"text-indent:24px;\">x</p>");
        assert_eq!(codec.import(&codec.export(&doc)), doc);
    }
}
