//! Styled document model for rich text editing.
//!
//! A [`StyledDocument`] stores text in a rope together with a sequence of
//! [`Run`]s. Runs are sorted, contiguous, cover every character exactly once
//! and are maximal: two neighbouring runs never carry equal attribute sets.
//!
//! Offsets are character indices. Paragraphs are delimited by `'\n'`; a
//! paragraph owns its terminating newline, and every character of a paragraph
//! carries the same [`BlockFormat`].
//!
//! Run lookup is a binary search over run boundaries, so edits cost time in
//! the number of runs, independent of the text length.

use std::ops::Range;

use horizon_richtext_core::logging::targets;
use ropey::Rope;

use crate::error::{Error, Result};
use crate::format::{AttributePatch, AttributeSet, BlockFormat, CharFormat};

/// A maximal range of characters sharing one attribute set.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// The character range covered by this run.
    pub range: Range<usize>,
    /// The attributes of every character in the range.
    pub attributes: AttributeSet,
}

impl Run {
    /// Create a new run.
    pub fn new(range: Range<usize>, attributes: AttributeSet) -> Self {
        Self { range, attributes }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Get the length of this run in characters.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Check if this run overlaps with a range.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.range.start < range.end && range.start < self.range.end
    }

    /// Check if this run contains a position.
    pub fn contains(&self, pos: usize) -> bool {
        self.range.contains(&pos)
    }
}

/// A detached piece of styled text: its characters plus run lengths.
///
/// Fragments are what the undo engine stores and what the clipboard copies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledFragment {
    /// The text of the fragment.
    pub text: String,
    /// `(length in characters, attributes)` for each run, in order.
    pub runs: Vec<(usize, AttributeSet)>,
}

impl StyledFragment {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|(len, _)| len).sum()
    }

    /// Check if the fragment holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the fragment contains a paragraph break.
    pub fn contains_newline(&self) -> bool {
        self.text.contains('\n')
    }

    /// Append another fragment, merging the touching runs when equal.
    pub fn append(&mut self, other: &StyledFragment) {
        self.text.push_str(&other.text);
        for (len, attrs) in &other.runs {
            match self.runs.last_mut() {
                Some((last_len, last)) if last == attrs => *last_len += len,
                _ => self.runs.push((*len, attrs.clone())),
            }
        }
    }
}

/// A styled text document that maintains text content with formatting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledDocument {
    text: Rope,
    runs: Vec<Run>,
}

impl StyledDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from plain, unstyled text.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.append(text, AttributeSet::default());
        doc
    }

    /// Get the plain text content.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Get the text in a character range.
    pub fn text_in(&self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        Ok(self.text.slice(range).to_string())
    }

    /// Get the character at a position.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        (pos < self.len()).then(|| self.text.char(pos))
    }

    /// Get the text length in characters.
    pub fn len(&self) -> usize {
        self.text.len_chars()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the runs.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Fail with [`Error::InvalidRange`] unless `range` lies inside the document.
    pub fn check_range(&self, range: &Range<usize>) -> Result<()> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(Error::invalid_range(range.start, range.end, len));
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn run_index_at(&self, pos: usize) -> usize {
        self.runs.partition_point(|r| r.range.end <= pos)
    }

    /// Get the attributes of the character at `pos`.
    pub fn attributes_at(&self, pos: usize) -> Option<&AttributeSet> {
        self.runs.get(self.run_index_at(pos)).map(|r| &r.attributes)
    }

    /// Get the character format at `pos`, or the default past the end.
    pub fn format_at(&self, pos: usize) -> CharFormat {
        self.attributes_at(pos)
            .map(|a| a.char_format.clone())
            .unwrap_or_default()
    }

    /// Runs overlapping `range`, each with the overlapping portion.
    pub fn runs_overlapping(&self, range: Range<usize>) -> Vec<(&Run, Range<usize>)> {
        if range.is_empty() {
            return Vec::new();
        }
        let first = self.run_index_at(range.start);
        self.runs[first..]
            .iter()
            .take_while(|run| run.range.start < range.end)
            .map(|run| {
                let start = run.range.start.max(range.start);
                let end = run.range.end.min(range.end);
                (run, start..end)
            })
            .collect()
    }

    /// Get the character format for a range.
    ///
    /// Returns `Some(format)` if the entire range has uniform formatting,
    /// or `None` if the formatting is mixed.
    pub fn format_for_range(&self, range: Range<usize>) -> Option<CharFormat> {
        if range.is_empty() {
            return Some(self.format_at(range.start));
        }
        let pieces = self.runs_overlapping(range);
        let (first, _) = pieces.first()?;
        pieces
            .iter()
            .all(|(run, _)| run.attributes.char_format == first.attributes.char_format)
            .then(|| first.attributes.char_format.clone())
    }

    /// Split into `(text, attributes)` pairs, one per run.
    pub fn to_styled_spans(&self) -> Vec<(String, &AttributeSet)> {
        self.runs
            .iter()
            .map(|run| (self.text.slice(run.range.clone()).to_string(), &run.attributes))
            .collect()
    }

    // =========================================================================
    // Paragraphs
    // =========================================================================

    /// Get the number of paragraphs.
    ///
    /// A trailing newline starts a final, empty paragraph.
    pub fn paragraph_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Get the character range of a paragraph, including its newline.
    pub fn paragraph_range(&self, para_idx: usize) -> Option<Range<usize>> {
        if para_idx >= self.paragraph_count() {
            return None;
        }
        let start = self.text.line_to_char(para_idx);
        Some(start..start + self.text.line(para_idx).len_chars())
    }

    /// Get the paragraph index for a position (`pos` may equal the length).
    pub fn paragraph_at(&self, pos: usize) -> usize {
        self.text.char_to_line(pos.min(self.len()))
    }

    /// Get the text of a paragraph, without its newline.
    pub fn paragraph_text(&self, para_idx: usize) -> Option<String> {
        let range = self.paragraph_range(para_idx)?;
        let text = self.text.slice(range).to_string();
        Some(text.strip_suffix('\n').map(str::to_string).unwrap_or(text))
    }

    /// The character range of all paragraphs touched by `range`.
    pub fn paragraph_span(&self, range: Range<usize>) -> Range<usize> {
        let first = self.paragraph_at(range.start);
        let last = if range.is_empty() {
            first
        } else {
            self.paragraph_at(range.end - 1)
        };
        let start = self
            .paragraph_range(first)
            .map_or(range.start, |r| r.start);
        let end = self.paragraph_range(last).map_or(range.end, |r| r.end);
        start..end
    }

    /// Get the block format of a paragraph.
    ///
    /// An empty final paragraph reports the format of the preceding newline.
    pub fn block_format_at(&self, para_idx: usize) -> BlockFormat {
        match self.paragraph_range(para_idx) {
            Some(range) if !range.is_empty() => self
                .attributes_at(range.start)
                .map(|a| a.block_format.clone())
                .unwrap_or_default(),
            Some(range) if range.start > 0 => self
                .attributes_at(range.start - 1)
                .map(|a| a.block_format.clone())
                .unwrap_or_default(),
            _ => BlockFormat::default(),
        }
    }

    /// Block formats of every paragraph touched by `range`, in order.
    pub fn block_formats_in(&self, range: Range<usize>) -> Vec<BlockFormat> {
        let first = self.paragraph_at(range.start);
        let last = if range.is_empty() {
            first
        } else {
            self.paragraph_at(range.end - 1)
        };
        (first..=last).map(|p| self.block_format_at(p)).collect()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Attributes that text inserted at `at` would receive.
    ///
    /// Character attributes come from `attributes` when given, otherwise from
    /// the preceding character (the default at offset 0). Block attributes
    /// always come from the paragraph being inserted into, unless that
    /// paragraph is empty.
    pub fn insertion_attributes(&self, at: usize, attributes: Option<&AttributeSet>) -> AttributeSet {
        let char_format = match attributes {
            Some(a) => a.char_format.clone(),
            None if at == 0 => CharFormat::default(),
            None => self.format_at(at - 1),
        };

        let para = self.paragraph_at(at);
        let para_empty = self.paragraph_range(para).is_none_or(|r| r.is_empty());
        let block_format = match attributes {
            Some(a) if para_empty => a.block_format.clone(),
            _ => self.block_format_at(para),
        };

        AttributeSet::new(char_format, block_format)
    }

    /// Insert text, returning the range it now occupies.
    pub fn insert_text(
        &mut self,
        at: usize,
        text: &str,
        attributes: Option<&AttributeSet>,
    ) -> Result<Range<usize>> {
        self.check_range(&(at..at))?;
        let len = text.chars().count();
        if len == 0 {
            return Ok(at..at);
        }

        let attrs = self.insertion_attributes(at, attributes);
        let idx = self.split_at(at);
        self.shift_runs(idx, len, 0);
        self.runs.insert(idx, Run::new(at..at + len, attrs));
        self.text.insert(at, text);
        self.coalesce(idx, idx + 1);

        tracing::trace!(target: targets::DOCUMENT, at, len, "inserted text");
        Ok(at..at + len)
    }

    /// Delete text in a range, returning the removed text.
    ///
    /// When a paragraph break is removed, the merged paragraph takes the block
    /// format of its first character.
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted = self.text.slice(range.clone()).to_string();
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        self.runs.drain(first..last);
        self.shift_runs(first, 0, range.len());
        self.text.remove(range.clone());
        self.coalesce(first, first);

        if deleted.contains('\n') {
            self.normalize_paragraphs(range.start..range.start);
        }

        tracing::trace!(target: targets::DOCUMENT, start = range.start, end = range.end, "deleted text");
        Ok(deleted)
    }

    /// Apply `f` to the attributes of every character in `range`.
    ///
    /// Returns `true` if any attribute changed.
    pub fn map_range(&mut self, range: Range<usize>, mut f: impl FnMut(&mut AttributeSet)) -> Result<bool> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(false);
        }

        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        let mut changed = false;
        for run in &mut self.runs[first..last] {
            let before = run.attributes.clone();
            f(&mut run.attributes);
            changed |= run.attributes != before;
        }
        self.coalesce(first, last);
        Ok(changed)
    }

    /// Apply `f` to the character format of every character in `range`.
    pub fn update_char_formats(&mut self, range: Range<usize>, mut f: impl FnMut(&mut CharFormat)) -> Result<bool> {
        self.map_range(range, |attrs| f(&mut attrs.char_format))
    }

    /// Apply `f` to the block format of every paragraph touched by `range`.
    pub fn update_block_formats(&mut self, range: Range<usize>, mut f: impl FnMut(&mut BlockFormat)) -> Result<bool> {
        self.check_range(&range)?;
        let span = self.paragraph_span(range);
        self.map_range(span, |attrs| f(&mut attrs.block_format))
    }

    /// Merge the `Some` fields of `patch` onto `range`.
    ///
    /// Character fields apply to the characters of `range`; block fields
    /// apply to every paragraph `range` touches.
    pub fn set_attributes(&mut self, range: Range<usize>, patch: &AttributePatch) -> Result<bool> {
        self.check_range(&range)?;
        let mut changed = false;
        if patch.touches_char() {
            changed |= self.update_char_formats(range.clone(), |f| patch.apply_char(f))?;
        }
        if patch.touches_block() {
            changed |= self.update_block_formats(range, |f| patch.apply_block(f))?;
        }
        Ok(changed)
    }

    /// Give every paragraph touched by `range` the block format of its first
    /// character.
    pub fn normalize_paragraphs(&mut self, range: Range<usize>) {
        let first = self.paragraph_at(range.start);
        let last = self.paragraph_at(range.end);
        for para in first..=last {
            let Some(prange) = self.paragraph_range(para) else {
                continue;
            };
            if prange.is_empty() {
                continue;
            }
            let block = self.block_format_at(para);
            let lo = self.split_at(prange.start);
            let hi = self.split_at(prange.end);
            for run in &mut self.runs[lo..hi] {
                run.attributes.block_format = block.clone();
            }
            self.coalesce(lo, hi);
        }
    }

    /// Append text with explicit attributes, without any inheritance rules.
    pub fn append(&mut self, text: &str, attributes: AttributeSet) {
        let len = text.chars().count();
        if len == 0 {
            return;
        }
        let start = self.len();
        self.text.insert(start, text);
        match self.runs.last_mut() {
            Some(last) if last.attributes == attributes => last.range.end += len,
            _ => self.runs.push(Run::new(start..start + len, attributes)),
        }
    }

    /// Copy a range out as a detached fragment.
    pub fn fragment(&self, range: Range<usize>) -> Result<StyledFragment> {
        self.check_range(&range)?;
        let runs = self
            .runs_overlapping(range.clone())
            .into_iter()
            .map(|(run, part)| (part.len(), run.attributes.clone()))
            .collect();
        Ok(StyledFragment {
            text: self.text.slice(range).to_string(),
            runs,
        })
    }

    /// Copy the whole document out as a fragment.
    pub fn to_fragment(&self) -> StyledFragment {
        StyledFragment {
            text: self.text(),
            runs: self
                .runs
                .iter()
                .map(|r| (r.len(), r.attributes.clone()))
                .collect(),
        }
    }

    /// Replace `range` with `fragment` exactly as stored.
    ///
    /// Returns the range the fragment now occupies.
    pub fn splice(&mut self, range: Range<usize>, fragment: &StyledFragment) -> Result<Range<usize>> {
        self.check_range(&range)?;
        let new_len = fragment.text.chars().count();

        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        let mut pos = range.start;
        let new_runs: Vec<Run> = fragment
            .runs
            .iter()
            .filter(|(len, _)| *len > 0)
            .map(|(len, attrs)| {
                let run = Run::new(pos..pos + len, attrs.clone());
                pos += len;
                run
            })
            .collect();
        let inserted = new_runs.len();
        self.runs.splice(first..last, new_runs);
        self.shift_runs(first + inserted, new_len, range.len());

        self.text.remove(range.clone());
        self.text.insert(range.start, &fragment.text);
        self.coalesce(first, first + inserted);

        Ok(range.start..range.start + new_len)
    }

    /// Replace the entire content with another document.
    pub fn replace_all(&mut self, other: StyledDocument) {
        *self = other;
    }

    // =========================================================================
    // Run maintenance
    // =========================================================================

    /// Ensure a run boundary at `pos`, returning the index of the run that
    /// starts there (or the run count when `pos` is the end).
    fn split_at(&mut self, pos: usize) -> usize {
        let idx = self.run_index_at(pos);
        let Some(run) = self.runs.get(idx) else {
            return idx;
        };
        if run.range.start == pos {
            return idx;
        }
        let tail = Run::new(pos..run.range.end, run.attributes.clone());
        self.runs[idx].range.end = pos;
        self.runs.insert(idx + 1, tail);
        idx + 1
    }

    /// Move runs from index `from` onwards by `grow - shrink` characters.
    fn shift_runs(&mut self, from: usize, grow: usize, shrink: usize) {
        if grow == shrink {
            return;
        }
        for run in &mut self.runs[from..] {
            run.range.start = run.range.start + grow - shrink;
            run.range.end = run.range.end + grow - shrink;
        }
    }

    /// Merge equal neighbours among runs `start - 1 ..= end`.
    fn coalesce(&mut self, start: usize, end: usize) {
        let mut i = start.saturating_sub(1);
        let mut end = end;
        while i < end && i + 1 < self.runs.len() {
            if self.runs[i].attributes == self.runs[i + 1].attributes {
                let next = self.runs.remove(i + 1);
                self.runs[i].range.end = next.range.end;
                end = end.saturating_sub(1);
            } else {
                i += 1;
            }
        }
    }

    /// Verify the structural invariants of the run sequence.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let len = self.len();
        if len == 0 {
            return if self.runs.is_empty() {
                Ok(())
            } else {
                Err(format!("empty document has {} runs", self.runs.len()))
            };
        }

        let mut expected = 0;
        for (i, run) in self.runs.iter().enumerate() {
            if run.range.start != expected {
                return Err(format!("run {i} starts at {} (expected {expected})", run.range.start));
            }
            if run.is_empty() {
                return Err(format!("run {i} is empty"));
            }
            if run
                .attributes
                .char_format
                .font_size
                .is_some_and(|size| !size.is_finite())
            {
                return Err(format!("run {i} has a non-finite font size"));
            }
            if i > 0 && self.runs[i - 1].attributes == run.attributes {
                return Err(format!("runs {} and {i} have identical attributes", i - 1));
            }
            expected = run.range.end;
        }
        if expected != len {
            return Err(format!("runs cover {expected} of {len} characters"));
        }

        for para in 0..self.paragraph_count() {
            let Some(range) = self.paragraph_range(para) else {
                continue;
            };
            let pieces = self.runs_overlapping(range);
            if let Some((first, _)) = pieces.first()
                && pieces
                    .iter()
                    .any(|(run, _)| run.attributes.block_format != first.attributes.block_format)
            {
                return Err(format!("paragraph {para} has mixed block formats"));
            }
        }
        Ok(())
    }
}
