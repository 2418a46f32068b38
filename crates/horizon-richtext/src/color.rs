//! RGBA colors used for text and highlight attributes.
//!
//! Colors are stored as 8-bit channels so that values survive an HTML
//! round-trip exactly.

use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

/// The CSS basic color keywords. Formatting prefers these names.
const BASIC_COLORS: [(&str, [u8; 3]); 16] = [
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
];

/// Additional names accepted when parsing.
const EXTRA_COLORS: [(&str, [u8; 3]); 5] = [
    ("grey", [128, 128, 128]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Parse a CSS color value.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and
    /// named colors (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Some(hex) = value.strip_prefix('#') {
            return Self::from_hex(hex);
        }

        let lower = value.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return parse_rgb_function(&lower);
        }

        Self::from_name(&lower)
    }

    /// Parse the digits of a hex color (without the leading `#`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Look up a named color.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self::rgba(0, 0, 0, 0));
        }
        BASIC_COLORS
            .iter()
            .chain(EXTRA_COLORS.iter())
            .find(|(n, _)| *n == name)
            .map(|(_, [r, g, b])| Self::rgb(*r, *g, *b))
    }

    /// The basic CSS name of this color, if it has one.
    pub fn basic_name(&self) -> Option<&'static str> {
        if !self.is_opaque() {
            return None;
        }
        BASIC_COLORS
            .iter()
            .find(|(_, rgb)| *rgb == [self.r, self.g, self.b])
            .map(|(name, _)| *name)
    }

    /// Format as a CSS value: a basic name when one matches exactly,
    /// `#rrggbb` for opaque colors and `#rrggbbaa` otherwise.
    pub fn to_css(&self) -> String {
        if let Some(name) = self.basic_name() {
            return name.to_string();
        }
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Error returned when a string is not a recognized color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized color '{0}'")]
pub struct InvalidColor(pub String);

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidColor(s.to_string()))
    }
}

fn parse_rgb_function(value: &str) -> Option<Color> {
    let start = value.find('(')?;
    let end = value.rfind(')')?;
    if end < start {
        return None;
    }
    let parts: Vec<&str> = value[start + 1..end].split(',').map(str::trim).collect();

    let channel = |s: &str| -> Option<u8> {
        if let Some(pct) = s.strip_suffix('%') {
            let v: f32 = pct.trim().parse().ok()?;
            Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let v: f32 = s.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        }
    };

    match parts.as_slice() {
        [r, g, b] => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f32 = a.parse().ok()?;
            let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
            Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, a))
        }
        _ => None,
    }
}
