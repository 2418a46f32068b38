//! Selections and the style summary reported for them.

use std::ops::Range;

use crate::color::Color;
use crate::document::StyledDocument;
use crate::format::AttributeSet;

/// A half-open character range `[start, end)`; `start == end` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection between two positions, in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A zero-length selection.
    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Whether this is a caret rather than a range.
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Number of selected characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if no characters are selected.
    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    /// The selection as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A color attribute that may differ across the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    /// Every selected character has this color (`None` = default color).
    Uniform(Option<Color>),
    /// The selection mixes colors.
    #[default]
    Mixed,
}

impl ColorState {
    fn merge(self, color: Option<Color>) -> Self {
        match self {
            ColorState::Uniform(c) if c == color => self,
            _ => ColorState::Mixed,
        }
    }
}

/// What toolbar state a selection implies.
///
/// Boolean fields are `true` only when the whole selection has the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleSummary {
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_in_bulleted_list: bool,
    pub text_color: ColorState,
    pub background_color: ColorState,
}

impl StyleSummary {
    /// Summarize a single attribute set.
    pub fn of(attrs: &AttributeSet) -> Self {
        let f = &attrs.char_format;
        Self {
            is_bold: f.bold,
            is_italic: f.italic,
            is_underline: f.underline,
            is_in_bulleted_list: attrs.block_format.list_item,
            text_color: ColorState::Uniform(f.foreground_color),
            background_color: ColorState::Uniform(f.background_color),
        }
    }

    /// Summarize a selection of `doc`.
    ///
    /// For a caret, `typing` (the attributes the next insertion will use) is
    /// reported when given, otherwise the attributes inherited at the caret.
    pub fn for_selection(doc: &StyledDocument, selection: Selection, typing: Option<&AttributeSet>) -> Self {
        if selection.is_caret() {
            let attrs = match typing {
                Some(attrs) => attrs.clone(),
                None => doc.insertion_attributes(selection.start, None),
            };
            return Self::of(&attrs);
        }

        let pieces = doc.runs_overlapping(selection.range());
        let Some((first, _)) = pieces.first() else {
            return Self::default();
        };
        let mut summary = Self::of(&first.attributes);
        for (run, _) in &pieces[1..] {
            let f = &run.attributes.char_format;
            summary.is_bold &= f.bold;
            summary.is_italic &= f.italic;
            summary.is_underline &= f.underline;
            summary.text_color = summary.text_color.merge(f.foreground_color);
            summary.background_color = summary.background_color.merge(f.background_color);
        }
        summary.is_in_bulleted_list = doc
            .block_formats_in(selection.range())
            .iter()
            .all(|b| b.list_item);
        summary
    }
}
