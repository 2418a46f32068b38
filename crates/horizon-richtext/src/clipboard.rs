//! Clipboard payloads.
//!
//! The engine never touches the OS clipboard. [`cut`](crate::RichTextEditor::cut)
//! and [`copy`](crate::RichTextEditor::copy) produce a [`ClipboardPayload`]
//! that the host places on its clipboard; the host hands one back to
//! [`paste`](crate::RichTextEditor::paste).

/// Format identifier for HTML written by this engine.
pub const PASTEBOARD_DATA_TYPE: &str = "com.horizon.richtext.html";

/// Format identifier for HTML from any source.
pub const HTML_DATA_TYPE: &str = "text/html";

/// Styled content attached to a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichContent {
    /// The format identifier the content was published under.
    pub data_type: String,
    /// The HTML markup.
    pub html: String,
}

/// What a copy produces and a paste consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardPayload {
    /// Plain-text rendition, always present.
    pub plain: String,
    /// Optional styled rendition.
    pub rich: Option<RichContent>,
}

impl ClipboardPayload {
    /// A payload carrying only plain text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain: text.into(),
            rich: None,
        }
    }

    /// A payload carrying plain text plus HTML under `data_type`.
    pub fn rich(text: impl Into<String>, data_type: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            plain: text.into(),
            rich: Some(RichContent {
                data_type: data_type.into(),
                html: html.into(),
            }),
        }
    }

    /// The HTML to paste, if the payload's styled content is acceptable.
    ///
    /// With `restrict_to_own_type`, only [`PASTEBOARD_DATA_TYPE`] content is
    /// accepted; otherwise [`HTML_DATA_TYPE`] content is accepted as well.
    pub fn accepted_html(&self, restrict_to_own_type: bool) -> Option<&str> {
        let rich = self.rich.as_ref()?;
        let accepted = rich.data_type == PASTEBOARD_DATA_TYPE
            || (!restrict_to_own_type && rich.data_type == HTML_DATA_TYPE);
        accepted.then_some(rich.html.as_str())
    }
}
