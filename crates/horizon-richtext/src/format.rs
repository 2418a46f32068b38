//! Character and paragraph formatting attributes.
//!
//! An [`AttributeSet`] pairs the character-level [`CharFormat`] of a piece of
//! text with the paragraph-level [`BlockFormat`] of the paragraph it belongs
//! to. Attribute sets are plain values: two runs with equal sets are merged.

use crate::color::Color;

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Align to the left edge (default).
    #[default]
    Left,
    /// Center the lines.
    Center,
    /// Align to the right edge.
    Right,
    /// Stretch lines to both edges.
    Justified,
}

impl Alignment {
    /// The CSS `text-align` keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justified => "justify",
        }
    }

    /// Parse a CSS `text-align` keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justified),
            _ => None,
        }
    }
}

/// Character-level formatting attributes.
///
/// All `Option` fields mean "use the editor default" when `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharFormat {
    /// Whether the text is bold.
    pub bold: bool,
    /// Whether the text is italic.
    pub italic: bool,
    /// Whether the text has underline.
    pub underline: bool,
    /// Font family name.
    pub font_family: Option<String>,
    /// Font size in pixels.
    pub font_size: Option<f32>,
    /// Foreground (text) color.
    pub foreground_color: Option<Color>,
    /// Background (highlight) color.
    pub background_color: Option<Color>,
}

impl CharFormat {
    /// Create a new default (unstyled) format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this format has any styling applied.
    pub fn is_styled(&self) -> bool {
        *self != Self::default()
    }

    /// Whether any property rendered through an inline `style` is set.
    pub fn has_inline_style(&self) -> bool {
        self.font_family.is_some()
            || self.font_size.is_some()
            || self.foreground_color.is_some()
            || self.background_color.is_some()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_font_family(mut self, family: Option<String>) -> Self {
        self.font_family = family;
        self
    }

    pub fn with_font_size(mut self, size: Option<f32>) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_foreground_color(mut self, color: Option<Color>) -> Self {
        self.foreground_color = color;
        self
    }

    pub fn with_background_color(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }
}

/// Paragraph-level formatting attributes.
///
/// Every character of a paragraph, including its terminating newline,
/// carries the same block format.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockFormat {
    /// Horizontal alignment.
    pub alignment: Alignment,
    /// Head indent in pixels. Never negative.
    pub indent: f32,
    /// Whether the first line is indented by one indentation step.
    pub first_line_indent: bool,
    /// Whether the paragraph is a bulleted list item.
    pub list_item: bool,
}

impl BlockFormat {
    /// Create a new default block format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this format differs from the default.
    pub fn is_styled(&self) -> bool {
        *self != Self::default()
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_indent(mut self, indent: f32) -> Self {
        self.indent = indent.max(0.0);
        self
    }

    pub fn with_first_line_indent(mut self, on: bool) -> Self {
        self.first_line_indent = on;
        self
    }

    pub fn with_list_item(mut self, on: bool) -> Self {
        self.list_item = on;
        self
    }
}

/// The complete attribute set of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSet {
    /// Character-level attributes.
    pub char_format: CharFormat,
    /// Paragraph-level attributes.
    pub block_format: BlockFormat,
}

impl AttributeSet {
    /// Create an attribute set from its two halves.
    pub fn new(char_format: CharFormat, block_format: BlockFormat) -> Self {
        Self {
            char_format,
            block_format,
        }
    }

    /// An attribute set with the given character format and default block format.
    pub fn with_char(char_format: CharFormat) -> Self {
        Self {
            char_format,
            block_format: BlockFormat::default(),
        }
    }

    /// Check if any attribute differs from the default.
    pub fn is_styled(&self) -> bool {
        self.char_format.is_styled() || self.block_format.is_styled()
    }
}

/// A partial attribute set: `Some` fields are written, `None` fields are kept.
///
/// Nullable attributes use a nested `Option` so that a patch can clear them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributePatch {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub font_family: Option<Option<String>>,
    pub font_size: Option<Option<f32>>,
    pub foreground_color: Option<Option<Color>>,
    pub background_color: Option<Option<Color>>,
    pub alignment: Option<Alignment>,
    pub indent: Option<f32>,
    pub first_line_indent: Option<bool>,
    pub list_item: Option<bool>,
}

impl AttributePatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch writes any character-level attribute.
    pub fn touches_char(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.font_family.is_some()
            || self.font_size.is_some()
            || self.foreground_color.is_some()
            || self.background_color.is_some()
    }

    /// Whether the patch writes any paragraph-level attribute.
    pub fn touches_block(&self) -> bool {
        self.alignment.is_some()
            || self.indent.is_some()
            || self.first_line_indent.is_some()
            || self.list_item.is_some()
    }

    /// Write the character-level fields onto `format`.
    pub fn apply_char(&self, format: &mut CharFormat) {
        if let Some(v) = self.bold {
            format.bold = v;
        }
        if let Some(v) = self.italic {
            format.italic = v;
        }
        if let Some(v) = self.underline {
            format.underline = v;
        }
        if let Some(v) = &self.font_family {
            format.font_family = v.clone();
        }
        if let Some(v) = self.font_size {
            format.font_size = v;
        }
        if let Some(v) = self.foreground_color {
            format.foreground_color = v;
        }
        if let Some(v) = self.background_color {
            format.background_color = v;
        }
    }

    /// Write the paragraph-level fields onto `format`.
    pub fn apply_block(&self, format: &mut BlockFormat) {
        if let Some(v) = self.alignment {
            format.alignment = v;
        }
        if let Some(v) = self.indent {
            format.indent = v.max(0.0);
        }
        if let Some(v) = self.first_line_indent {
            format.first_line_indent = v;
        }
        if let Some(v) = self.list_item {
            format.list_item = v;
        }
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bold = Some(on);
        self
    }

    pub fn italic(mut self, on: bool) -> Self {
        self.italic = Some(on);
        self
    }

    pub fn underline(mut self, on: bool) -> Self {
        self.underline = Some(on);
        self
    }

    pub fn font_family(mut self, family: Option<String>) -> Self {
        self.font_family = Some(family);
        self
    }

    pub fn font_size(mut self, size: Option<f32>) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn foreground_color(mut self, color: Option<Color>) -> Self {
        self.foreground_color = Some(color);
        self
    }

    pub fn background_color(mut self, color: Option<Color>) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn indent(mut self, indent: f32) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn first_line_indent(mut self, on: bool) -> Self {
        self.first_line_indent = Some(on);
        self
    }

    pub fn list_item(mut self, on: bool) -> Self {
        self.list_item = Some(on);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unstyled() {
        assert!(!AttributeSet::default().is_styled());
        assert!(!CharFormat::new().has_inline_style());
    }

    #[test]
    fn test_equality_covers_every_key() {
        let base = AttributeSet::default();
        let mut other = base.clone();
        other.block_format.first_line_indent = true;
        assert_ne!(base, other);

        let colored = AttributeSet::with_char(CharFormat::new().with_foreground_color(Some(Color::RED)));
        assert_ne!(base, colored);
        assert!(colored.char_format.has_inline_style());
    }

    #[test]
    fn test_patch_apply() {
        let patch = AttributePatch::new()
            .bold(true)
            .font_size(Some(18.0))
            .indent(-5.0)
            .alignment(Alignment::Center);
        assert!(patch.touches_char());
        assert!(patch.touches_block());

        let mut attrs = AttributeSet::with_char(CharFormat::new().with_italic(true));
        patch.apply_char(&mut attrs.char_format);
        patch.apply_block(&mut attrs.block_format);

        assert!(attrs.char_format.bold);
        assert!(attrs.char_format.italic);
        assert_eq!(attrs.char_format.font_size, Some(18.0));
        assert_eq!(attrs.block_format.indent, 0.0);
        assert_eq!(attrs.block_format.alignment, Alignment::Center);
    }

    #[test]
    fn test_patch_can_clear() {
        let mut format = CharFormat::new().with_font_family(Some("Serif".into()));
        AttributePatch::new().font_family(None).apply_char(&mut format);
        assert_eq!(format.font_family, None);
    }

    #[test]
    fn test_alignment_css() {
        for align in [
            Alignment::Left,
            Alignment::Center,
            Alignment::Right,
            Alignment::Justified,
        ] {
            assert_eq!(Alignment::from_css(align.as_css()), Some(align));
        }
        assert_eq!(Alignment::from_css("JUSTIFY"), Some(Alignment::Justified));
        assert_eq!(Alignment::from_css("middle"), None);
    }
}
