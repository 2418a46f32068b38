//! Editor session.
//!
//! [`RichTextEditor`] owns a document, its selection and its undo history.
//! Every mutating call follows the same sequence:
//!
//! 1. the selection or range is validated ([`Error::InvalidRange`] on failure,
//!    with the document untouched),
//! 2. the delegate previews the change and may veto it,
//! 3. the document is mutated and one undo entry is recorded,
//! 4. `content_changed` fires, then `selection_changed`.
//!
//! Hooks go to the [`EditorDelegate`] first, then to the matching [`Signal`].

use std::fmt;
use std::ops::Range;

use horizon_richtext_core::logging::{span_names, targets};
use horizon_richtext_core::{PerfSpan, Signal};
use unicode_segmentation::UnicodeSegmentation;

use crate::clipboard::{ClipboardPayload, PASTEBOARD_DATA_TYPE};
use crate::color::Color;
use crate::config::EditorConfig;
use crate::delegate::{DefaultDataSource, EditorDataSource, EditorDelegate, NoopDelegate, PreviewChange, PreviewDecision};
use crate::document::StyledDocument;
use crate::error::{ConfigError, Error, Result};
use crate::format::{Alignment, AttributeSet, BlockFormat, CharFormat};
use crate::html::HtmlCodec;
use crate::selection::{Selection, StyleSummary};
use crate::undo::{UndoEntry, UndoOutcome, UndoStack};

/// An editing session over one styled document.
pub struct RichTextEditor {
    document: StyledDocument,
    selection: Selection,
    /// Attributes for the next insertion at a caret; cleared when the
    /// selection moves.
    typing_attributes: Option<AttributeSet>,
    undo_stack: UndoStack,
    config: EditorConfig,
    delegate: Box<dyn EditorDelegate>,
    data_source: Box<dyn EditorDataSource>,

    /// Signal emitted after the document changed.
    pub content_changed: Signal<()>,

    /// Signal emitted when the selection or the style it reports changed.
    pub selection_changed: Signal<(Selection, StyleSummary)>,
}

impl Default for RichTextEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RichTextEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextEditor")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("typing_attributes", &self.typing_attributes)
            .field("undo_stack", &self.undo_stack)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RichTextEditor {
    /// Create an empty editor with the default configuration.
    pub fn new() -> Self {
        Self {
            document: StyledDocument::new(),
            selection: Selection::default(),
            typing_attributes: None,
            undo_stack: UndoStack::new(),
            config: EditorConfig::default(),
            delegate: Box::new(NoopDelegate),
            data_source: Box::new(DefaultDataSource),
            content_changed: Signal::new(),
            selection_changed: Signal::new(),
        }
    }

    /// Create an empty editor with a validated configuration.
    pub fn with_config(config: EditorConfig) -> Result<Self> {
        let mut editor = Self::new();
        editor.set_config(config)?;
        Ok(editor)
    }

    /// Start from `document` without recording an undo entry.
    ///
    /// The caret is placed at the end.
    pub fn with_document(mut self, document: StyledDocument) -> Self {
        self.selection = Selection::caret(document.len());
        self.document = document;
        self.undo_stack.clear();
        self
    }

    // =========================================================================
    // Collaborators and configuration
    // =========================================================================

    pub fn set_delegate(&mut self, delegate: impl EditorDelegate + 'static) {
        self.delegate = Box::new(delegate);
    }

    /// Install a data source and apply its undo depth.
    pub fn set_data_source(&mut self, data_source: impl EditorDataSource + 'static) {
        self.data_source = Box::new(data_source);
        self.apply_undo_depth();
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the configuration after validating it.
    pub fn set_config(&mut self, config: EditorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.apply_undo_depth();
        Ok(())
    }

    fn apply_undo_depth(&mut self) {
        let depth = self
            .config
            .effective_levels_of_undo(self.data_source.levels_of_undo());
        tracing::debug!(target: targets::CONFIG, ?depth, "undo depth");
        self.undo_stack.set_max_size(depth);
    }

    /// The marker a renderer draws in front of list items.
    pub fn bullet_string(&self) -> &str {
        &self.config.bullet_string
    }

    /// The format identifier attached to copied HTML.
    pub fn pasteboard_data_type() -> &'static str {
        PASTEBOARD_DATA_TYPE
    }

    fn codec(&self) -> HtmlCodec {
        HtmlCodec::new().with_indentation_size(self.config.default_indentation_size)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn document(&self) -> &StyledDocument {
        &self.document
    }

    /// The plain text of the document.
    pub fn text(&self) -> String {
        self.document.text()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Whether at least one character is selected.
    pub fn has_selection(&self) -> bool {
        !self.selection.is_caret()
    }

    /// The selected text.
    pub fn selected_text(&self) -> String {
        self.document
            .text_in(self.selection.range())
            .unwrap_or_default()
    }

    /// Attributes of the character at `offset`.
    pub fn attributes_at(&self, offset: usize) -> Result<&AttributeSet> {
        let len = self.document.len();
        self.document
            .attributes_at(offset)
            .filter(|_| offset < len)
            .ok_or_else(|| Error::invalid_range(offset, offset + 1, len))
    }

    /// Attributes the next insertion at a caret will use, if overridden.
    pub fn typing_attributes(&self) -> Option<&AttributeSet> {
        self.typing_attributes.as_ref()
    }

    /// Toolbar state for the current selection.
    pub fn style_summary(&self) -> StyleSummary {
        StyleSummary::for_selection(&self.document, self.selection, self.typing_attributes.as_ref())
    }

    /// The document as HTML.
    pub fn html(&self) -> String {
        self.codec().export(&self.document)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Move the selection.
    ///
    /// Clears the typing attributes and ends the current typing run.
    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.document.check_range(&selection.range())?;
        self.undo_stack.break_merge();
        if selection == self.selection {
            return Ok(());
        }
        self.selection = selection;
        self.typing_attributes = None;
        self.notify_selection();
        Ok(())
    }

    /// Select the whole document.
    pub fn select_all(&mut self) -> Result<()> {
        self.set_selection(Selection::new(0, self.document.len()))
    }

    // =========================================================================
    // Character styles
    // =========================================================================

    /// Toggle bold, anchored on the first selected character.
    pub fn toggle_bold(&mut self) -> Result<bool> {
        let on = !self.anchor_attributes()?.char_format.bold;
        self.apply_char_change(PreviewChange::Bold, |f| f.bold = on)
    }

    /// Toggle italic, anchored on the first selected character.
    pub fn toggle_italic(&mut self) -> Result<bool> {
        let on = !self.anchor_attributes()?.char_format.italic;
        self.apply_char_change(PreviewChange::Italic, |f| f.italic = on)
    }

    /// Toggle underline, anchored on the first selected character.
    pub fn toggle_underline(&mut self) -> Result<bool> {
        let on = !self.anchor_attributes()?.char_format.underline;
        self.apply_char_change(PreviewChange::Underline, |f| f.underline = on)
    }

    /// Set the font family (`None` for the default family).
    pub fn set_font_name(&mut self, family: Option<&str>) -> Result<bool> {
        let family = family.map(str::to_string);
        self.apply_char_change(PreviewChange::FontSize, |f| f.font_family = family.clone())
    }

    /// Set the font size, clamped to the configured bounds.
    ///
    /// A non-finite size changes nothing.
    pub fn set_font_size(&mut self, size: f32) -> Result<bool> {
        if !size.is_finite() {
            return Ok(false);
        }
        let size = self.config.clamp_font_size(size);
        self.apply_char_change(PreviewChange::FontSize, |f| f.font_size = Some(size))
    }

    /// Change every run's font size by `delta`, clamping each to `[min, max]`.
    ///
    /// Runs without an explicit size start from the default font size. Bounds
    /// that are not finite or out of order are a [`ConfigError::FontSizeBounds`];
    /// a non-finite `delta` changes nothing.
    pub fn change_font_size_by(&mut self, delta: f32, min: f32, max: f32) -> Result<bool> {
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::FontSizeBounds { min, max }.into());
        }
        if !delta.is_finite() {
            return Ok(false);
        }
        let default_size = self.config.default_font_size;
        self.apply_char_change(PreviewChange::FontResize, |f| {
            let size = f.font_size.unwrap_or(default_size);
            f.font_size = Some((size + delta).clamp(min, max));
        })
    }

    /// Grow the selection's font by the configured step.
    pub fn increase_font_size(&mut self) -> Result<bool> {
        let c = &self.config;
        let (step, min, max) = (c.font_size_change_amount, c.min_font_size, c.max_font_size);
        self.change_font_size_by(step, min, max)
    }

    /// Shrink the selection's font by the configured step.
    pub fn decrease_font_size(&mut self) -> Result<bool> {
        let c = &self.config;
        let (step, min, max) = (c.font_size_change_amount, c.min_font_size, c.max_font_size);
        self.change_font_size_by(-step, min, max)
    }

    /// Set the text color (`None` for the default color).
    pub fn set_text_color(&mut self, color: Option<Color>) -> Result<bool> {
        self.apply_char_change(PreviewChange::FontColor, |f| f.foreground_color = color)
    }

    /// Set the highlight color (`None` to remove the highlight).
    pub fn set_highlight_color(&mut self, color: Option<Color>) -> Result<bool> {
        self.apply_char_change(PreviewChange::Highlight, |f| f.background_color = color)
    }

    // =========================================================================
    // Paragraph styles
    // =========================================================================

    /// Align the touched paragraphs.
    pub fn set_alignment(&mut self, alignment: Alignment) -> Result<bool> {
        self.apply_block_change(PreviewChange::IndentIncrease, |b| b.alignment = alignment)
    }

    /// Indent the touched paragraphs by one step.
    pub fn increase_indent(&mut self) -> Result<bool> {
        let step = self.config.default_indentation_size;
        self.apply_block_change(PreviewChange::IndentIncrease, |b| b.indent += step)
    }

    /// Outdent the touched paragraphs by one step, stopping at zero.
    pub fn decrease_indent(&mut self) -> Result<bool> {
        let step = self.config.default_indentation_size;
        self.apply_block_change(PreviewChange::IndentDecrease, |b| {
            b.indent = (b.indent - step).max(0.0)
        })
    }

    /// Toggle list membership of the touched paragraphs, anchored on the first.
    ///
    /// Paragraphs entering the list are indented by one step; paragraphs
    /// leaving it lose one step.
    pub fn toggle_bullet(&mut self) -> Result<bool> {
        let on = !self.anchor_attributes()?.block_format.list_item;
        let step = self.config.default_indentation_size;
        self.apply_block_change(PreviewChange::Bullet, |b| {
            if b.list_item == on {
                return;
            }
            b.list_item = on;
            b.indent = if on { b.indent + step } else { (b.indent - step).max(0.0) };
        })
    }

    /// Toggle the first-line indent of the touched paragraphs, anchored on
    /// the first.
    pub fn toggle_first_line_indent(&mut self) -> Result<bool> {
        let on = !self.anchor_attributes()?.block_format.first_line_indent;
        let kind = if on {
            PreviewChange::IndentIncrease
        } else {
            PreviewChange::IndentDecrease
        };
        self.apply_block_change(kind, |b| b.first_line_indent = on)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replace the selection with `text`, as if typed.
    ///
    /// Consecutive typing at a caret is undone as one step.
    pub fn insert_text(&mut self, text: &str) -> Result<bool> {
        let kind = match text {
            " " => PreviewChange::Space,
            "\n" => PreviewChange::Enter,
            _ => PreviewChange::KeyDown,
        };
        let typing = self.config.coalesce_typing
            && self.selection.is_caret()
            && matches!(kind, PreviewChange::KeyDown | PreviewChange::Space);
        let attributes = self.typing_attributes.clone();
        self.replace_text(kind, self.selection.range(), text, attributes, typing)
    }

    /// Insert a page-break marker at the selection.
    pub fn insert_page_break(&mut self, marker: &str) -> Result<bool> {
        let attributes = self.typing_attributes.clone();
        self.replace_text(PreviewChange::PageBreak, self.selection.range(), marker, attributes, false)
    }

    /// Delete `range`; the caret ends up at its start.
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<bool> {
        self.replace_text(PreviewChange::Delete, range, "", None, false)
    }

    /// Delete the selection, or the grapheme before the caret.
    pub fn delete_backward(&mut self) -> Result<bool> {
        let sel = self.selection;
        if !sel.is_caret() {
            return self.delete_range(sel.range());
        }
        if sel.start == 0 {
            return Ok(false);
        }
        let start = self.previous_boundary(sel.start)?;
        self.delete_range(start..sel.start)
    }

    /// Delete the selection, or the grapheme after the caret.
    pub fn delete_forward(&mut self) -> Result<bool> {
        let sel = self.selection;
        if !sel.is_caret() {
            return self.delete_range(sel.range());
        }
        if sel.start >= self.document.len() {
            return Ok(false);
        }
        let end = self.next_boundary(sel.start)?;
        self.delete_range(sel.start..end)
    }

    /// Replace `range` with `text` styled like the first replaced character.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> Result<bool> {
        self.document.check_range(&range)?;
        let attributes = if range.is_empty() {
            None
        } else {
            self.document.attributes_at(range.start).cloned()
        };
        self.replace_text(PreviewChange::FindReplace, range, text, attributes, false)
    }

    /// Replace the whole content as one undoable change.
    pub fn change_to_document(&mut self, document: StyledDocument) -> Result<bool> {
        let region = 0..self.document.len();
        let changed = self.commit(PreviewChange::Paste, region, false, |doc| {
            doc.replace_all(document);
            Ok(Selection::caret(doc.len()))
        })?;
        if changed {
            self.typing_attributes = None;
        }
        Ok(changed)
    }

    /// Replace the whole content with imported HTML.
    ///
    /// Malformed markup is imported as plain text.
    pub fn set_html(&mut self, html: &str) -> Result<bool> {
        let document = self.codec().import(html);
        self.change_to_document(document)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// The selection as a clipboard payload, or `None` with a caret.
    pub fn copy(&self) -> Option<ClipboardPayload> {
        if self.selection.is_caret() {
            return None;
        }
        let fragment = self.document.fragment(self.selection.range()).ok()?;
        let mut copied = StyledDocument::new();
        copied.splice(0..0, &fragment).ok()?;
        let html = self.codec().export(&copied);
        Some(ClipboardPayload::rich(fragment.text, PASTEBOARD_DATA_TYPE, html))
    }

    /// Copy the selection and delete it.
    ///
    /// Returns `None` with a caret or when the change is vetoed.
    pub fn cut(&mut self) -> Result<Option<ClipboardPayload>> {
        let Some(payload) = self.copy() else {
            return Ok(None);
        };
        let cut = self.replace_text(PreviewChange::Cut, self.selection.range(), "", None, false)?;
        Ok(cut.then_some(payload))
    }

    /// Replace the selection with clipboard content.
    ///
    /// Styled content is used when the payload's format is accepted
    /// (see [`ClipboardPayload::accepted_html`]); otherwise the plain text is
    /// inserted. Pasted paragraphs join the paragraph at the selection, which
    /// keeps its own block format.
    pub fn paste(&mut self, payload: &ClipboardPayload) -> Result<bool> {
        let range = self.selection.range();
        self.document.check_range(&range)?;

        let restricted = self.config.allows_rich_text_paste_only_from_this_class;
        let Some(html) = payload.accepted_html(restricted) else {
            let attributes = self.typing_attributes.clone();
            return self.replace_text(PreviewChange::Paste, range, &payload.plain, attributes, false);
        };

        let fragment = self.codec().import(html).to_fragment();
        if fragment.is_empty() && range.is_empty() {
            return Ok(false);
        }
        let host_block = self
            .document
            .block_format_at(self.document.paragraph_at(range.start));
        let region = self.paragraph_tail_region(&range);
        self.commit(PreviewChange::Paste, region, false, |doc| {
            let inserted = doc.splice(range, &fragment)?;
            doc.update_block_formats(inserted.start..inserted.start, |b| *b = host_block.clone())?;
            doc.normalize_paragraphs(inserted.clone());
            Ok(Selection::caret(inserted.end))
        })
    }

    // =========================================================================
    // Undo/Redo
    // =========================================================================

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    /// Forget all undo and redo entries.
    pub fn clear_undo_history(&mut self) {
        self.undo_stack.clear();
    }

    /// The undo history.
    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Revert the most recent change.
    ///
    /// When the delegate handles undo itself, it receives the entry and the
    /// document is left alone.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        let Some(entry) = self.undo_stack.peek_undo().cloned() else {
            tracing::debug!(target: targets::UNDO, "nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };
        if self.delegate.handles_undo_redo_for_text() {
            tracing::debug!(target: targets::UNDO, sequence = entry.sequence, "undo delegated");
            self.delegate.user_performed_undo(&entry);
            return Ok(UndoOutcome::Delegated);
        }

        let _span = PerfSpan::new(span_names::UNDO_REPLAY);
        entry.revert(&mut self.document)?;
        self.undo_stack.undo();
        tracing::debug!(target: targets::UNDO, sequence = entry.sequence, kind = ?entry.kind, "undid change");
        self.finish_replay(entry.selection_before);
        Ok(UndoOutcome::Applied)
    }

    /// Reapply the most recently undone change.
    pub fn redo(&mut self) -> Result<UndoOutcome> {
        let Some(entry) = self.undo_stack.peek_redo().cloned() else {
            tracing::debug!(target: targets::UNDO, "nothing to redo");
            return Ok(UndoOutcome::NothingToRedo);
        };
        if self.delegate.handles_undo_redo_for_text() {
            tracing::debug!(target: targets::UNDO, sequence = entry.sequence, "redo delegated");
            self.delegate.user_performed_redo(&entry);
            return Ok(UndoOutcome::Delegated);
        }

        let _span = PerfSpan::new(span_names::UNDO_REPLAY);
        entry.reapply(&mut self.document)?;
        self.undo_stack.redo();
        tracing::debug!(target: targets::UNDO, sequence = entry.sequence, kind = ?entry.kind, "redid change");
        self.finish_replay(entry.selection_after);
        Ok(UndoOutcome::Applied)
    }

    fn finish_replay(&mut self, selection: Selection) {
        self.selection = selection;
        self.typing_attributes = None;
        self.notify_content();
        self.notify_selection();
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Ask the delegate whether `kind` may proceed.
    fn preview(&mut self, kind: PreviewChange) -> bool {
        let decision = self.delegate.preview_change(kind);
        if decision == PreviewDecision::Veto {
            tracing::trace!(target: targets::EDITOR, ?kind, "change vetoed");
            return false;
        }
        true
    }

    fn notify_content(&mut self) {
        self.delegate.content_changed();
        self.content_changed.emit(());
    }

    fn notify_selection(&mut self) {
        let summary = self.style_summary();
        self.delegate.selection_changed(self.selection, &summary);
        self.selection_changed.emit((self.selection, summary));
    }

    /// The attributes toggles anchor on: the first selected character, or
    /// what the next insertion would use at a caret.
    fn anchor_attributes(&self) -> Result<AttributeSet> {
        let sel = self.selection;
        self.document.check_range(&sel.range())?;
        if sel.is_caret() {
            return Ok(self
                .document
                .insertion_attributes(sel.start, self.typing_attributes.as_ref()));
        }
        Ok(self
            .document
            .attributes_at(sel.start)
            .cloned()
            .unwrap_or_default())
    }

    /// The range plus the rest of the paragraph it ends in.
    fn paragraph_tail_region(&self, range: &Range<usize>) -> Range<usize> {
        let para = self.document.paragraph_at(range.end);
        let end = self
            .document
            .paragraph_range(para)
            .map_or(range.end, |r| r.end);
        range.start..end.max(range.end)
    }

    fn apply_char_change(&mut self, kind: PreviewChange, f: impl Fn(&mut CharFormat)) -> Result<bool> {
        let sel = self.selection;
        self.document.check_range(&sel.range())?;
        if sel.is_caret() {
            if !self.preview(kind) {
                return Ok(false);
            }
            self.undo_stack.break_merge();
            let mut typing = self
                .document
                .insertion_attributes(sel.start, self.typing_attributes.as_ref());
            f(&mut typing.char_format);
            self.typing_attributes = Some(typing);
            self.notify_selection();
            return Ok(true);
        }
        self.commit(kind, sel.range(), false, |doc| {
            doc.update_char_formats(sel.range(), f)?;
            Ok(sel)
        })
    }

    fn apply_block_change(&mut self, kind: PreviewChange, f: impl Fn(&mut BlockFormat)) -> Result<bool> {
        let sel = self.selection;
        self.document.check_range(&sel.range())?;
        let span = self.document.paragraph_span(sel.range());
        if span.is_empty() {
            // An empty paragraph has no characters to carry the format yet.
            if !self.preview(kind) {
                return Ok(false);
            }
            self.undo_stack.break_merge();
            let mut typing = self
                .document
                .insertion_attributes(sel.start, self.typing_attributes.as_ref());
            f(&mut typing.block_format);
            self.typing_attributes = Some(typing);
            self.notify_selection();
            return Ok(true);
        }
        self.commit(kind, span.clone(), false, |doc| {
            doc.update_block_formats(span, f)?;
            Ok(sel)
        })
    }

    /// Delete `range` and insert `text` in its place.
    fn replace_text(
        &mut self,
        kind: PreviewChange,
        range: Range<usize>,
        text: &str,
        attributes: Option<AttributeSet>,
        typing: bool,
    ) -> Result<bool> {
        self.document.check_range(&range)?;
        if range.is_empty() && text.is_empty() {
            return Ok(false);
        }
        let region = if self.document.text_in(range.clone())?.contains('\n') {
            self.paragraph_tail_region(&range)
        } else {
            range.clone()
        };
        self.commit(kind, region, typing, |doc| {
            doc.delete_range(range.clone())?;
            let inserted = doc.insert_text(range.start, text, attributes.as_ref())?;
            Ok(Selection::caret(inserted.end))
        })
    }

    /// Preview, mutate and record one change.
    ///
    /// `region` must contain every character the mutation can affect; the
    /// mutation returns the selection to leave behind.
    fn commit(
        &mut self,
        kind: PreviewChange,
        region: Range<usize>,
        typing: bool,
        mutate: impl FnOnce(&mut StyledDocument) -> Result<Selection>,
    ) -> Result<bool> {
        self.document.check_range(&region)?;
        if !self.preview(kind) {
            return Ok(false);
        }
        let _span = PerfSpan::new(span_names::COMMAND);

        let old_len = self.document.len();
        let before = self.document.fragment(region.clone())?;
        let selection_before = self.selection;
        let selection_after = mutate(&mut self.document)?;
        let end = region.end + self.document.len() - old_len;
        let after = self.document.fragment(region.start..end)?;

        if before == after {
            tracing::trace!(target: targets::EDITOR, ?kind, "change had no effect");
            if selection_after != self.selection {
                self.selection = selection_after;
                self.notify_selection();
            }
            return Ok(false);
        }

        tracing::debug!(
            target: targets::EDITOR,
            ?kind,
            start = region.start,
            end = region.end,
            new_end = end,
            "committed change"
        );
        let mut entry = UndoEntry::new(kind, region.start, before, after, selection_before, selection_after);
        if typing {
            entry = entry.typing();
        }
        self.undo_stack.push(entry);

        self.selection = selection_after;
        self.notify_content();
        self.notify_selection();
        Ok(true)
    }

    fn previous_boundary(&self, pos: usize) -> Result<usize> {
        let para = self.document.paragraph_at(pos);
        let start = self.document.paragraph_range(para).map_or(0, |r| r.start);
        if pos == start {
            return Ok(pos - 1);
        }
        let text = self.document.text_in(start..pos)?;
        Ok(text
            .graphemes(true)
            .next_back()
            .map_or(pos - 1, |g| pos - g.chars().count()))
    }

    fn next_boundary(&self, pos: usize) -> Result<usize> {
        if self.document.char_at(pos) == Some('\n') {
            return Ok(pos + 1);
        }
        let para = self.document.paragraph_at(pos);
        let mut end = self
            .document
            .paragraph_range(para)
            .map_or(self.document.len(), |r| r.end);
        if end > pos && self.document.char_at(end - 1) == Some('\n') {
            end -= 1;
        }
        let text = self.document.text_in(pos..end)?;
        Ok(text
            .graphemes(true)
            .next()
            .map_or(pos + 1, |g| pos + g.chars().count()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::selection::ColorState;

    fn editor_with(text: &str) -> RichTextEditor {
        RichTextEditor::new().with_document(StyledDocument::from_text(text))
    }

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock())
        }
    }

    struct Recording {
        log: Log,
        veto: Option<PreviewChange>,
    }

    impl EditorDelegate for Recording {
        fn preview_change(&mut self, kind: PreviewChange) -> PreviewDecision {
            self.log.0.lock().push(format!("preview {kind:?}"));
            if self.veto == Some(kind) {
                PreviewDecision::Veto
            } else {
                PreviewDecision::Proceed
            }
        }

        fn content_changed(&mut self) {
            self.log.0.lock().push("content".into());
        }

        fn selection_changed(&mut self, selection: Selection, _summary: &StyleSummary) {
            self.log
                .0
                .lock()
                .push(format!("selection {}..{}", selection.start, selection.end));
        }
    }

    #[test]
    fn test_toggle_bold_twice_restores() {
        let mut editor = editor_with("Hello World");
        editor.select_all().unwrap();
        let original = editor.document().clone();

        assert!(editor.toggle_bold().unwrap());
        assert_eq!(editor.document().runs().len(), 1);
        assert!(editor.document().format_at(0).bold);

        assert!(editor.toggle_bold().unwrap());
        assert_eq!(editor.document(), &original);
    }

    #[test]
    fn test_toggle_anchors_on_first_character() {
        let mut doc = StyledDocument::new();
        doc.append("He", AttributeSet::default());
        doc.append("llo", AttributeSet::with_char(CharFormat::new().with_bold(true)));
        let mut editor = RichTextEditor::new().with_document(doc);
        editor.select_all().unwrap();

        editor.toggle_bold().unwrap();
        assert_eq!(editor.document().runs().len(), 1);
        assert!(editor.document().format_at(0).bold);
    }

    #[test]
    fn test_caret_toggle_sets_typing_attributes() {
        let mut editor = editor_with("ab");
        assert!(editor.toggle_italic().unwrap());
        assert!(!editor.can_undo());
        assert!(editor.typing_attributes().unwrap().char_format.italic);

        editor.insert_text("c").unwrap();
        assert!(editor.document().format_at(2).italic);
        assert!(!editor.document().format_at(1).italic);

        editor.set_selection(Selection::caret(0)).unwrap();
        assert!(editor.typing_attributes().is_none());
    }

    #[test]
    fn test_notification_order() {
        let log = Log::default();
        let mut editor = editor_with("abc");
        editor.set_delegate(Recording {
            log: log.clone(),
            veto: None,
        });
        let emitted = Arc::new(Mutex::new(0));
        let counter = emitted.clone();
        editor.content_changed.connect(move |_| *counter.lock() += 1);

        editor.set_selection(Selection::new(0, 2)).unwrap();
        log.take();
        editor.toggle_underline().unwrap();
        assert_eq!(log.take(), vec!["preview Underline", "content", "selection 0..2"]);
        assert_eq!(*emitted.lock(), 1);
    }

    #[test]
    fn test_veto_leaves_document_untouched() {
        let log = Log::default();
        let mut editor = editor_with("abc");
        editor.set_delegate(Recording {
            log: log.clone(),
            veto: Some(PreviewChange::Bold),
        });
        editor.select_all().unwrap();
        log.take();

        assert!(!editor.toggle_bold().unwrap());
        assert!(!editor.document().format_at(0).bold);
        assert!(!editor.can_undo());
        assert_eq!(log.take(), vec!["preview Bold"]);
    }

    #[test]
    fn test_invalid_range_is_reported() {
        let mut editor = editor_with("abc");
        assert!(matches!(
            editor.set_selection(Selection::new(1, 9)),
            Err(Error::InvalidRange { start: 1, end: 9, len: 3 })
        ));
        assert!(editor.delete_range(2..5).is_err());
        assert!(editor.attributes_at(3).is_err());
        assert_eq!(editor.text(), "abc");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_typing_is_one_undo_step() {
        let mut editor = RichTextEditor::new();
        for ch in ["H", "i", " ", "t", "o"] {
            editor.insert_text(ch).unwrap();
        }
        assert_eq!(editor.text(), "Hi to");
        assert_eq!(editor.undo_stack().undo_count(), 1);

        assert_eq!(editor.undo().unwrap(), UndoOutcome::Applied);
        assert_eq!(editor.text(), "");
        assert_eq!(editor.redo().unwrap(), UndoOutcome::Applied);
        assert_eq!(editor.text(), "Hi to");
        assert_eq!(editor.selection(), Selection::caret(5));
    }

    #[test]
    fn test_selection_move_breaks_typing_run() {
        let mut editor = RichTextEditor::new();
        editor.insert_text("a").unwrap();
        editor.set_selection(Selection::caret(1)).unwrap();
        editor.insert_text("b").unwrap();
        assert_eq!(editor.undo_stack().undo_count(), 2);

        editor.insert_text("\n").unwrap();
        editor.insert_text("c").unwrap();
        assert_eq!(editor.undo_stack().undo_count(), 4);
    }

    #[test]
    fn test_caret_style_change_breaks_typing_run() {
        let mut editor = RichTextEditor::new();
        editor.insert_text("a").unwrap();
        editor.toggle_bold().unwrap();
        editor.insert_text("b").unwrap();
        assert!(editor.document().format_at(1).bold);
        assert_eq!(editor.undo_stack().undo_count(), 2);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "a");
        editor.undo().unwrap();
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_undo_redo_on_empty_stack() {
        let mut editor = editor_with("abc");
        assert_eq!(editor.undo().unwrap(), UndoOutcome::NothingToUndo);
        assert_eq!(editor.redo().unwrap(), UndoOutcome::NothingToRedo);
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut editor = editor_with("abc");
        editor.select_all().unwrap();
        editor.toggle_bold().unwrap();
        editor.undo().unwrap();
        assert!(editor.can_redo());
        editor.toggle_italic().unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_font_size_clamps_per_run() {
        let mut doc = StyledDocument::new();
        doc.append("a", AttributeSet::with_char(CharFormat::new().with_font_size(Some(120.0))));
        doc.append("b", AttributeSet::default());
        let mut editor = RichTextEditor::new().with_document(doc);
        editor.select_all().unwrap();

        editor.increase_font_size().unwrap();
        assert_eq!(editor.document().format_at(0).font_size, Some(128.0));
        assert_eq!(editor.document().format_at(1).font_size, Some(22.0));

        for _ in 0..13 {
            editor.decrease_font_size().unwrap();
        }
        assert_eq!(editor.document().runs().len(), 1);
        assert_eq!(editor.document().format_at(0).font_size, Some(10.0));
    }

    #[test]
    fn test_font_size_rejects_bad_input() {
        let mut editor = editor_with("abcd");
        editor.select_all().unwrap();
        let before = editor.document().clone();

        assert!(matches!(
            editor.change_font_size_by(5.0, 50.0, 20.0),
            Err(Error::Config(ConfigError::FontSizeBounds { .. }))
        ));
        assert!(editor.change_font_size_by(5.0, f32::NAN, 20.0).is_err());
        assert!(!editor.change_font_size_by(f32::INFINITY, 10.0, 20.0).unwrap());
        assert_eq!(editor.document(), &before);

        editor.set_selection(Selection::new(0, 2)).unwrap();
        assert!(!editor.set_font_size(f32::NAN).unwrap());
        editor.set_selection(Selection::new(2, 4)).unwrap();
        assert!(!editor.set_font_size(f32::NAN).unwrap());
        assert_eq!(editor.document().runs().len(), 1);
        assert!(editor.document().check_invariants().is_ok());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_indent_never_negative() {
        let mut editor = editor_with("one\ntwo");
        editor.select_all().unwrap();
        editor.increase_indent().unwrap();
        assert_eq!(editor.document().block_format_at(1).indent, 15.0);
        editor.decrease_indent().unwrap();
        assert!(!editor.decrease_indent().unwrap());
        assert_eq!(editor.document().block_format_at(0).indent, 0.0);
    }

    #[test]
    fn test_toggle_bullet_indents() {
        let mut editor = editor_with("one\ntwo\nthree");
        editor.set_selection(Selection::new(1, 5)).unwrap();
        editor.toggle_bullet().unwrap();

        let doc = editor.document();
        assert!(doc.block_format_at(0).list_item);
        assert!(doc.block_format_at(1).list_item);
        assert!(!doc.block_format_at(2).list_item);
        assert_eq!(doc.block_format_at(0).indent, 15.0);
        assert!(editor.style_summary().is_in_bulleted_list);

        editor.toggle_bullet().unwrap();
        assert_eq!(editor.document().block_format_at(0), BlockFormat::default());
        assert_eq!(editor.bullet_string(), "\u{2022}\u{a0}");
    }

    #[test]
    fn test_bullet_on_empty_document_applies_to_next_text() {
        let mut editor = RichTextEditor::new();
        assert!(editor.toggle_bullet().unwrap());
        editor.insert_text("item").unwrap();
        assert!(editor.document().block_format_at(0).list_item);
    }

    #[test]
    fn test_delete_backward_graphemes() {
        let mut editor = editor_with("ae\u{301}\nx");
        editor.set_selection(Selection::caret(3)).unwrap();
        editor.delete_backward().unwrap();
        assert_eq!(editor.text(), "a\nx");
        assert_eq!(editor.selection(), Selection::caret(1));

        editor.set_selection(Selection::caret(2)).unwrap();
        editor.delete_backward().unwrap();
        assert_eq!(editor.text(), "ax");

        editor.set_selection(Selection::caret(0)).unwrap();
        assert!(!editor.delete_backward().unwrap());
        editor.delete_forward().unwrap();
        assert_eq!(editor.text(), "x");
    }

    #[test]
    fn test_delete_paragraph_break_undo() {
        let mut editor = editor_with("ab\ncd");
        editor.set_selection(Selection::new(3, 5)).unwrap();
        editor.set_alignment(Alignment::Center).unwrap();
        let styled = editor.document().clone();

        editor.set_selection(Selection::caret(2)).unwrap();
        editor.delete_forward().unwrap();
        assert_eq!(editor.text(), "abcd");
        assert_eq!(editor.document().block_format_at(0).alignment, Alignment::Left);

        editor.undo().unwrap();
        assert_eq!(editor.document(), &styled);
        assert!(editor.document().check_invariants().is_ok());
    }

    #[test]
    fn test_replace_range_keeps_style() {
        let mut editor = editor_with("say hello");
        editor.set_selection(Selection::new(4, 9)).unwrap();
        editor.set_text_color(Some(Color::BLUE)).unwrap();
        editor.replace_range(4..9, "bye").unwrap();
        assert_eq!(editor.text(), "say bye");
        assert_eq!(editor.document().format_at(4).foreground_color, Some(Color::BLUE));
        assert_eq!(editor.undo_stack().peek_undo().unwrap().kind, PreviewChange::FindReplace);
    }

    #[test]
    fn test_cut_and_paste_rich() {
        let mut editor = editor_with("bold plain");
        editor.set_selection(Selection::new(0, 4)).unwrap();
        editor.toggle_bold().unwrap();

        let payload = editor.cut().unwrap().unwrap();
        assert_eq!(payload.plain, "bold");
        assert_eq!(editor.text(), " plain");

        editor.set_selection(Selection::caret(6)).unwrap();
        assert!(editor.paste(&payload).unwrap());
        assert_eq!(editor.text(), " plainbold");
        assert!(editor.document().format_at(6).bold);
        assert_eq!(editor.selection(), Selection::caret(10));
    }

    #[test]
    fn test_foreign_html_pastes_as_plain_text() {
        let mut editor = RichTextEditor::new();
        let payload = ClipboardPayload::rich("x", "text/html", "<b>x</b>");
        editor.paste(&payload).unwrap();
        assert_eq!(editor.text(), "x");
        assert!(!editor.document().format_at(0).bold);

        let mut open = RichTextEditor::with_config(EditorConfig::new().with_rich_paste_restricted(false)).unwrap();
        open.paste(&payload).unwrap();
        assert!(open.document().format_at(0).bold);
    }

    #[test]
    fn test_set_html_is_undoable() {
        let mut editor = editor_with("old");
        editor.set_html("<p><i>new</i></p>").unwrap();
        assert_eq!(editor.text(), "new");
        assert_eq!(editor.html(), "<p><i>new</i></p>");
        editor.undo().unwrap();
        assert_eq!(editor.text(), "old");
    }

    #[test]
    fn test_highlight_summary() {
        let mut editor = editor_with("abcd");
        editor.set_selection(Selection::new(0, 2)).unwrap();
        editor.set_highlight_color(Some(Color::YELLOW)).unwrap();
        editor.select_all().unwrap();
        assert_eq!(editor.style_summary().background_color, ColorState::Mixed);
    }

    #[test]
    fn test_undo_depth_precedence() {
        struct Depth;
        impl EditorDataSource for Depth {
            fn levels_of_undo(&self) -> Option<usize> {
                Some(2)
            }
        }

        let mut editor = RichTextEditor::with_config(EditorConfig::new().with_levels_of_undo(Some(5))).unwrap();
        assert_eq!(editor.undo_stack().max_size(), Some(5));
        editor.set_data_source(Depth);
        assert_eq!(editor.undo_stack().max_size(), Some(2));

        for _ in 0..4 {
            editor.insert_text("\n").unwrap();
        }
        assert_eq!(editor.undo_stack().undo_count(), 2);
    }

    #[test]
    fn test_delegated_undo() {
        struct Owner(Log);
        impl EditorDelegate for Owner {
            fn handles_undo_redo_for_text(&self) -> bool {
                true
            }
            fn user_performed_undo(&mut self, entry: &UndoEntry) {
                self.0.0.lock().push(format!("undo {:?}", entry.kind));
            }
        }

        let log = Log::default();
        let mut editor = editor_with("abc");
        editor.select_all().unwrap();
        editor.toggle_bold().unwrap();
        editor.set_delegate(Owner(log.clone()));

        assert_eq!(editor.undo().unwrap(), UndoOutcome::Delegated);
        assert!(editor.document().format_at(0).bold);
        assert_eq!(log.take(), vec!["undo Bold"]);
    }
}
