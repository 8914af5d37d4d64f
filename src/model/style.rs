//! Text styling attributes shared by content nodes and grid cells.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Font size used when the source does not provide one.
pub const DEFAULT_FONT_SIZE_PT: f64 = 11.0;

/// Text styling properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleAttrs {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Font size in points
    pub font_size_pt: f64,

    /// Text color as uppercase `RRGGBB` hex
    pub color_hex: Option<String>,

    /// Horizontal alignment
    pub text_align: Option<TextAlign>,
}

impl StyleAttrs {
    /// Create default styling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bold styling at the default size.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    /// Italic styling at the default size.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    /// Set the font size and return self.
    pub fn with_font_size(mut self, size_pt: f64) -> Self {
        self.font_size_pt = size_pt;
        self
    }

    /// Set the color from a CSS color string. Unparseable colors are ignored.
    pub fn with_css_color(mut self, css: &str) -> Self {
        self.color_hex = Self::parse_color(css);
        self
    }

    /// Check if any emphasis is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline
    }

    /// Fold emphasis from another run into this one.
    ///
    /// Size, color and alignment stay with the first run.
    pub fn absorb(&mut self, other: &StyleAttrs) {
        self.bold |= other.bold;
        self.italic |= other.italic;
        self.underline |= other.underline;
    }

    /// Normalize `#rgb`, `#rrggbb` or `rgb(r, g, b)` to uppercase `RRGGBB`.
    pub fn parse_color(css: &str) -> Option<String> {
        static RGB: OnceLock<Regex> = OnceLock::new();
        let rgb = RGB.get_or_init(|| {
            Regex::new(r"(?i)^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,[^)]*)?\)$")
                .expect("color pattern is valid")
        });

        let css = css.trim();
        if let Some(caps) = rgb.captures(css) {
            let mut hex = String::with_capacity(6);
            for i in 1..=3 {
                let channel: u32 = caps[i].parse().ok()?;
                hex.push_str(&format!("{:02X}", channel.min(255)));
            }
            return Some(hex);
        }

        let digits = css.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => Some(digits.to_ascii_uppercase()),
            3 => Some(
                digits
                    .chars()
                    .flat_map(|c| [c, c])
                    .collect::<String>()
                    .to_ascii_uppercase(),
            ),
            _ => None,
        }
    }
}

impl Default for StyleAttrs {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            color_hex: None,
            text_align: None,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left alignment
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
}
