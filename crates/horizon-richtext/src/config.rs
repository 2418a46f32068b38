//! Editor configuration.
//!
//! [`EditorConfig`] can be built in code or loaded from TOML. Every field is
//! optional in TOML; missing fields take their defaults.
//!
//! ```
//! use horizon_richtext::EditorConfig;
//!
//! let config = EditorConfig::from_toml_str("max_font_size = 72.0\nlevels_of_undo = 50").unwrap();
//! assert_eq!(config.max_font_size, 72.0);
//! assert_eq!(config.min_font_size, 10.0);
//! assert_eq!(config.levels_of_undo, Some(50));
//! ```

use std::path::Path;

use horizon_richtext_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// The marker a renderer draws in front of list items.
pub const DEFAULT_BULLET_STRING: &str = "\u{2022}\u{00A0}";

/// Tunables of an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Step used by `increase_font_size` / `decrease_font_size`.
    pub font_size_change_amount: f32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    /// Size assumed for text without an explicit font size.
    pub default_font_size: f32,
    /// Indent step for paragraph indentation, also the first-line indent width.
    pub default_indentation_size: f32,
    /// Undo depth; `None` or 0 for unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels_of_undo: Option<usize>,
    /// Accept styled paste only from payloads tagged by this engine.
    pub allows_rich_text_paste_only_from_this_class: bool,
    /// Merge consecutive typing into one undo entry.
    pub coalesce_typing: bool,
    pub bullet_string: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size_change_amount: 10.0,
            max_font_size: 128.0,
            min_font_size: 10.0,
            default_font_size: 12.0,
            default_indentation_size: 15.0,
            levels_of_undo: None,
            allows_rich_text_paste_only_from_this_class: true,
            coalesce_typing: true,
            bullet_string: DEFAULT_BULLET_STRING.to_string(),
        }
    }
}

impl EditorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Syntax(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded editor configuration");
        Ok(config)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Syntax(e.to_string()).into())
    }

    /// Write the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| Error::io(path, e))?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "saved editor configuration");
        Ok(())
    }

    /// Check that sizes are positive and the font size bounds are ordered.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let positive = [
            ("font_size_change_amount", self.font_size_change_amount),
            ("max_font_size", self.max_font_size),
            ("min_font_size", self.min_font_size),
            ("default_font_size", self.default_font_size),
            ("default_indentation_size", self.default_indentation_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.min_font_size > self.max_font_size {
            return Err(ConfigError::FontSizeBounds {
                min: self.min_font_size,
                max: self.max_font_size,
            });
        }
        Ok(())
    }

    /// Undo depth after applying a data source's answer, if any.
    ///
    /// `None` means unbounded.
    pub fn effective_levels_of_undo(&self, from_data_source: Option<usize>) -> Option<usize> {
        from_data_source
            .or(self.levels_of_undo)
            .filter(|&levels| levels > 0)
    }

    /// Clamp a font size to the configured bounds.
    pub fn clamp_font_size(&self, size: f32) -> f32 {
        size.max(self.min_font_size).min(self.max_font_size)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn with_font_size_change_amount(mut self, amount: f32) -> Self {
        self.font_size_change_amount = amount;
        self
    }

    pub fn with_font_size_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_font_size = min;
        self.max_font_size = max;
        self
    }

    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn with_default_indentation_size(mut self, size: f32) -> Self {
        self.default_indentation_size = size;
        self
    }

    pub fn with_levels_of_undo(mut self, levels: Option<usize>) -> Self {
        self.levels_of_undo = levels;
        self
    }

    pub fn with_rich_paste_restricted(mut self, restricted: bool) -> Self {
        self.allows_rich_text_paste_only_from_this_class = restricted;
        self
    }

    pub fn with_coalesce_typing(mut self, coalesce: bool) -> Self {
        self.coalesce_typing = coalesce;
        self
    }

    pub fn with_bullet_string(mut self, bullet: impl Into<String>) -> Self {
        self.bullet_string = bullet.into();
        self
    }
}
