//! Logging facilities for Horizon RichText.
//!
//! Horizon RichText uses the `tracing` crate for instrumentation. Install a
//! subscriber in your application to see logs:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_richtext::undo=debug")
//!     .init();
//! ```
//!
//! Every event is emitted under one of the [`targets`], so a single
//! subsystem can be enabled without the others.

/// Span names used throughout Horizon RichText for tracing.
pub mod span_names {
    /// HTML export span.
    pub const HTML_EXPORT: &str = "horizon_richtext::html_export";
    /// HTML import span.
    pub const HTML_IMPORT: &str = "horizon_richtext::html_import";
    /// Editing command span (one per user-visible operation).
    pub const COMMAND: &str = "horizon_richtext::command";
    /// Undo/redo replay span.
    pub const UNDO_REPLAY: &str = "horizon_richtext::undo_replay";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_richtext_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_richtext_core::signal";
    /// Styled document model target.
    pub const DOCUMENT: &str = "horizon_richtext::document";
    /// Editor session target.
    pub const EDITOR: &str = "horizon_richtext::editor";
    /// HTML codec target.
    pub const HTML: &str = "horizon_richtext::html";
    /// Undo engine target.
    pub const UNDO: &str = "horizon_richtext::undo";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_richtext::config";
    /// Performance spans target.
    pub const PERF: &str = "horizon_richtext::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_richtext::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
