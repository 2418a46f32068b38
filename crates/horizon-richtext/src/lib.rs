//! Styled-text document engine for Horizon RichText.
//!
//! This crate provides:
//!
//! - **Run Model**: Text plus maximal runs of uniform attributes
//! - **Style Operations**: Bold/italic/underline toggles, fonts, colors,
//!   alignment, indentation and bulleted lists over a selection
//! - **HTML Codec**: Lossless export/import for a fixed tag vocabulary
//! - **Undo/Redo**: Before/after entries with typing coalescing
//!
//! # Example
//!
//! ```
//! use horizon_richtext::{RichTextEditor, Selection, StyledDocument};
//!
//! let mut editor = RichTextEditor::new().with_document(StyledDocument::from_text("Hello World"));
//! editor.set_selection(Selection::new(0, 5)).unwrap();
//! editor.toggle_bold().unwrap();
//! assert_eq!(editor.html(), "<p><b>Hello</b> World</p>");
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.html(), "<p>Hello World</p>");
//! ```

pub mod clipboard;
pub mod color;
pub mod config;
pub mod delegate;
pub mod document;
pub mod editor;
pub mod format;
pub mod html;
pub mod selection;
pub mod undo;

mod error;

pub use clipboard::{ClipboardPayload, HTML_DATA_TYPE, PASTEBOARD_DATA_TYPE};
pub use color::Color;
pub use config::EditorConfig;
pub use delegate::{
    DefaultDataSource, DelegateChain, EditorDataSource, EditorDelegate, NoopDelegate, PreviewChange,
    PreviewDecision,
};
pub use document::{Run, StyledDocument, StyledFragment};
pub use editor::RichTextEditor;
pub use error::{ConfigError, Error, ParseError, Result};
pub use format::{Alignment, AttributePatch, AttributeSet, BlockFormat, CharFormat};
pub use html::{HtmlCodec, export_html, import_html};
pub use selection::{ColorState, Selection, StyleSummary};
pub use undo::{UndoEntry, UndoOutcome, UndoStack};
