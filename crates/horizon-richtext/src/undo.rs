//! Undo/redo history.
//!
//! Each committed change is recorded as an [`UndoEntry`]: the styled content
//! of the affected region before and after the change. Undo splices the
//! "before" fragment back in; redo splices the "after" fragment.
//!
//! Consecutive typing is coalesced into one entry until something else
//! (a non-typing change, a selection move, an undo or redo) breaks the run.

use std::ops::Range;

use horizon_richtext_core::logging::targets;

use crate::delegate::PreviewChange;
use crate::document::{StyledDocument, StyledFragment};
use crate::error::Result;
use crate::selection::Selection;

/// One reversible change.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    /// The operation that produced the change.
    pub kind: PreviewChange,
    /// Commit order; assigned when the entry is pushed.
    pub sequence: u64,
    /// Offset of the affected region.
    pub start: usize,
    /// The region's content before the change.
    pub before: StyledFragment,
    /// The region's content after the change.
    pub after: StyledFragment,
    /// Selection to restore on undo.
    pub selection_before: Selection,
    /// Selection to restore on redo.
    pub selection_after: Selection,
    typing: bool,
}

impl UndoEntry {
    /// Create an entry for a change at `start`.
    pub fn new(
        kind: PreviewChange,
        start: usize,
        before: StyledFragment,
        after: StyledFragment,
        selection_before: Selection,
        selection_after: Selection,
    ) -> Self {
        Self {
            kind,
            sequence: 0,
            start,
            before,
            after,
            selection_before,
            selection_after,
            typing: false,
        }
    }

    /// Mark the entry as typed text, eligible for coalescing.
    pub fn typing(mut self) -> Self {
        self.typing = true;
        self
    }

    /// Whether the entry records typed text.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// The range the "after" content occupies in the current document.
    pub fn after_range(&self) -> Range<usize> {
        self.start..self.start + self.after.len()
    }

    /// The range the "before" content occupies once undone.
    pub fn before_range(&self) -> Range<usize> {
        self.start..self.start + self.before.len()
    }

    /// Restore the "before" content.
    pub fn revert(&self, doc: &mut StyledDocument) -> Result<()> {
        doc.splice(self.after_range(), &self.before)?;
        Ok(())
    }

    /// Restore the "after" content.
    pub fn reapply(&self, doc: &mut StyledDocument) -> Result<()> {
        doc.splice(self.before_range(), &self.after)?;
        Ok(())
    }

    /// Try to merge another command into this one for coalescing.
    ///
    /// Succeeds when both are typing, `other` inserts (replaces nothing)
    /// directly after this entry's text, and neither involves a newline.
    fn try_merge(&mut self, other: &UndoEntry) -> bool {
        if !self.typing || !other.typing {
            return false;
        }
        if !other.before.is_empty() || other.start != self.start + self.after.len() {
            return false;
        }
        if self.after.contains_newline() || other.after.contains_newline() {
            return false;
        }
        self.after.append(&other.after);
        self.selection_after = other.selection_after;
        true
    }
}

/// Manages undo/redo history.
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of entries; `index` separates undoable from redoable ones.
    entries: Vec<UndoEntry>,
    index: usize,
    /// Maximum number of entries to keep (`None` for unbounded).
    max_size: Option<usize>,
    merge_enabled: bool,
    next_sequence: u64,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    /// Create an unbounded stack.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            max_size: None,
            merge_enabled: true,
            next_sequence: 1,
        }
    }

    /// Create a stack keeping at most `max_size` entries (0 = unbounded).
    pub fn with_max_size(max_size: Option<usize>) -> Self {
        let mut stack = Self::new();
        stack.set_max_size(max_size);
        stack
    }

    /// Change the depth limit, evicting the oldest entries if needed.
    pub fn set_max_size(&mut self, max_size: Option<usize>) {
        self.max_size = max_size.filter(|&n| n > 0);
        self.enforce_max_size();
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// Record a committed change.
    ///
    /// Clears the redo history. Returns `true` if the entry was coalesced
    /// into the previous one.
    pub fn push(&mut self, mut entry: UndoEntry) -> bool {
        self.entries.truncate(self.index);

        if self.merge_enabled
            && let Some(last) = self.entries.last_mut()
            && last.try_merge(&entry)
        {
            tracing::trace!(target: targets::UNDO, sequence = last.sequence, "coalesced typing");
            return true;
        }
        self.merge_enabled = true;

        entry.sequence = self.next_sequence;
        self.next_sequence += 1;
        tracing::debug!(
            target: targets::UNDO,
            sequence = entry.sequence,
            kind = ?entry.kind,
            start = entry.start,
            "recorded undo entry"
        );
        self.entries.push(entry);
        self.index = self.entries.len();
        self.enforce_max_size();
        false
    }

    fn enforce_max_size(&mut self) {
        if let Some(max) = self.max_size
            && self.entries.len() > max
        {
            let excess = self.entries.len() - max;
            self.entries.drain(0..excess);
            self.index = self.index.saturating_sub(excess);
            tracing::trace!(target: targets::UNDO, evicted = excess, "evicted oldest undo entries");
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.entries.len()
    }

    /// The entry the next undo would revert.
    pub fn peek_undo(&self) -> Option<&UndoEntry> {
        self.index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// The entry the next redo would reapply.
    pub fn peek_redo(&self) -> Option<&UndoEntry> {
        self.entries.get(self.index)
    }

    /// Step back, returning the entry to revert.
    pub fn undo(&mut self) -> Option<&UndoEntry> {
        if self.can_undo() {
            self.index -= 1;
            self.merge_enabled = false;
            Some(&self.entries[self.index])
        } else {
            None
        }
    }

    /// Step forward, returning the entry to reapply.
    pub fn redo(&mut self) -> Option<&UndoEntry> {
        if self.can_redo() {
            let entry = &self.entries[self.index];
            self.index += 1;
            self.merge_enabled = false;
            Some(entry)
        } else {
            None
        }
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.merge_enabled = true;
    }

    /// Stop the next entry from coalescing into the current one.
    pub fn break_merge(&mut self) {
        self.merge_enabled = false;
    }

    /// Number of entries that can be undone.
    pub fn undo_count(&self) -> usize {
        self.index
    }

    /// Number of entries that can be redone.
    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.index
    }
}

/// The result of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The entry was applied to the document.
    Applied,
    /// The host owns undo; the entry was handed to it.
    Delegated,
    /// The undo stack was empty.
    NothingToUndo,
    /// The redo stack was empty.
    NothingToRedo,
}
