//! Capability traits through which an editor talks to its host.
//!
//! Every hook has a no-op default, so a host implements only what it needs.
//! [`DelegateChain`] composes two implementations.

use crate::selection::{Selection, StyleSummary};
use crate::undo::UndoEntry;

/// The kind of change an editor is about to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewChange {
    Bold,
    Italic,
    Underline,
    FontResize,
    Highlight,
    FontSize,
    FontColor,
    IndentIncrease,
    IndentDecrease,
    Cut,
    Paste,
    PageBreak,
    Space,
    Enter,
    Bullet,
    MouseDown,
    ArrowKey,
    KeyDown,
    Delete,
    FindReplace,
}

impl PreviewChange {
    /// Whether this kind is routine input rather than a user command.
    pub fn is_non_special(&self) -> bool {
        matches!(
            self,
            PreviewChange::MouseDown | PreviewChange::ArrowKey | PreviewChange::KeyDown
        )
    }

    /// Human-readable name, e.g. for an undo menu item.
    ///
    /// Non-special kinds return `None` unless `non_special` is set.
    pub fn describe(&self, non_special: bool) -> Option<&'static str> {
        if self.is_non_special() && !non_special {
            return None;
        }
        Some(match self {
            PreviewChange::Bold => "Bold",
            PreviewChange::Italic => "Italic",
            PreviewChange::Underline => "Underline",
            PreviewChange::FontResize => "Font Resize",
            PreviewChange::Highlight => "Highlight",
            PreviewChange::FontSize => "Font Size",
            PreviewChange::FontColor => "Font Color",
            PreviewChange::IndentIncrease => "Increase Indent",
            PreviewChange::IndentDecrease => "Decrease Indent",
            PreviewChange::Cut => "Cut",
            PreviewChange::Paste => "Paste",
            PreviewChange::PageBreak => "Page Break",
            PreviewChange::Space => "Space",
            PreviewChange::Enter => "Enter",
            PreviewChange::Bullet => "Bullet",
            PreviewChange::MouseDown => "Mouse Down",
            PreviewChange::ArrowKey => "Arrow Key",
            PreviewChange::KeyDown => "Typing",
            PreviewChange::Delete => "Delete",
            PreviewChange::FindReplace => "Find and Replace",
        })
    }
}

/// A host's answer to a preview notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewDecision {
    /// Let the change happen.
    #[default]
    Proceed,
    /// Cancel the change; the document is left untouched.
    Veto,
}

/// Hooks an editor invokes around each change.
pub trait EditorDelegate {
    /// Called before a change is applied.
    fn preview_change(&mut self, _kind: PreviewChange) -> PreviewDecision {
        PreviewDecision::Proceed
    }

    /// Called after the document changed.
    fn content_changed(&mut self) {}

    /// Called after the selection or its style changed.
    fn selection_changed(&mut self, _selection: Selection, _summary: &StyleSummary) {}

    /// Whether the host owns undo/redo of text changes.
    ///
    /// When `true`, [`user_performed_undo`](Self::user_performed_undo) and
    /// [`user_performed_redo`](Self::user_performed_redo) receive the entry
    /// instead of the editor applying it.
    fn handles_undo_redo_for_text(&self) -> bool {
        false
    }

    fn user_performed_undo(&mut self, _entry: &UndoEntry) {}

    fn user_performed_redo(&mut self, _entry: &UndoEntry) {}
}

/// Configuration an editor pulls from its host.
pub trait EditorDataSource {
    /// Maximum undo depth, or `None` to use the editor configuration.
    fn levels_of_undo(&self) -> Option<usize> {
        None
    }
}

/// A delegate that accepts everything and ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelegate;

impl EditorDelegate for NoopDelegate {}

/// A data source that supplies nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDataSource;

impl EditorDataSource for DefaultDataSource {}

impl<T: EditorDelegate + ?Sized> EditorDelegate for Box<T> {
    fn preview_change(&mut self, kind: PreviewChange) -> PreviewDecision {
        (**self).preview_change(kind)
    }

    fn content_changed(&mut self) {
        (**self).content_changed()
    }

    fn selection_changed(&mut self, selection: Selection, summary: &StyleSummary) {
        (**self).selection_changed(selection, summary)
    }

    fn handles_undo_redo_for_text(&self) -> bool {
        (**self).handles_undo_redo_for_text()
    }

    fn user_performed_undo(&mut self, entry: &UndoEntry) {
        (**self).user_performed_undo(entry)
    }

    fn user_performed_redo(&mut self, entry: &UndoEntry) {
        (**self).user_performed_redo(entry)
    }
}

impl<T: EditorDataSource + ?Sized> EditorDataSource for Box<T> {
    fn levels_of_undo(&self) -> Option<usize> {
        (**self).levels_of_undo()
    }
}

/// Offers every hook to a primary and then a secondary implementation.
///
/// A change is vetoed if either side vetoes it. Undo ownership is claimed if
/// either side claims it, and the entry goes to the first side that does.
/// For data sources, the primary's answer wins when it has one.
#[derive(Debug, Clone, Default)]
pub struct DelegateChain<A, B> {
    pub primary: A,
    pub secondary: B,
}

impl<A, B> DelegateChain<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: EditorDelegate, B: EditorDelegate> EditorDelegate for DelegateChain<A, B> {
    fn preview_change(&mut self, kind: PreviewChange) -> PreviewDecision {
        let first = self.primary.preview_change(kind);
        let second = self.secondary.preview_change(kind);
        if first == PreviewDecision::Veto || second == PreviewDecision::Veto {
            PreviewDecision::Veto
        } else {
            PreviewDecision::Proceed
        }
    }

    fn content_changed(&mut self) {
        self.primary.content_changed();
        self.secondary.content_changed();
    }

    fn selection_changed(&mut self, selection: Selection, summary: &StyleSummary) {
        self.primary.selection_changed(selection, summary);
        self.secondary.selection_changed(selection, summary);
    }

    fn handles_undo_redo_for_text(&self) -> bool {
        self.primary.handles_undo_redo_for_text() || self.secondary.handles_undo_redo_for_text()
    }

    fn user_performed_undo(&mut self, entry: &UndoEntry) {
        if self.primary.handles_undo_redo_for_text() {
            self.primary.user_performed_undo(entry);
        } else {
            self.secondary.user_performed_undo(entry);
        }
    }

    fn user_performed_redo(&mut self, entry: &UndoEntry) {
        if self.primary.handles_undo_redo_for_text() {
            self.primary.user_performed_redo(entry);
        } else {
            self.secondary.user_performed_redo(entry);
        }
    }
}

impl<A: EditorDataSource, B: EditorDataSource> EditorDataSource for DelegateChain<A, B> {
    fn levels_of_undo(&self) -> Option<usize> {
        self.primary
            .levels_of_undo()
            .or_else(|| self.secondary.levels_of_undo())
    }
}
