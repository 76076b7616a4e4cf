//! Font metrics for box estimation

use unicode_segmentation::UnicodeSegmentation;

/// Advance widths of a proportional sans-serif face, in em
fn sans_advance(c: char) -> f32 {
    match c {
        ' ' => 0.28,
        'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '!' | '|' => 0.24,
        'f' | 'r' | 't' | 'I' | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '"' | '/' => 0.34,
        'm' | 'w' => 0.8,
        'M' | 'W' => 0.86,
        '@' | '%' => 0.9,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.56,
        'a'..='z' => 0.52,
        _ => 0.56,
    }
}

/// Metrics needed for text layout
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
    /// Width of full-width (CJK, emoji) characters
    pub wide_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // Editor body text: 14px at 1.6
        Self::sans(14.0, 1.6)
    }
}

impl FontMetrics {
    /// Proportional sans-serif face at `size` pixels
    pub fn sans(size: f32, line_height_ratio: f32) -> Self {
        let char_widths = (0u8..128)
            .map(|b| {
                let c = b as char;
                if c.is_ascii_control() {
                    0.0
                } else {
                    sans_advance(c) * size
                }
            })
            .collect();

        Self {
            size,
            line_height: size * line_height_ratio,
            char_widths,
            default_width: 0.56 * size,
            wide_width: size,
        }
    }

    /// Monospace face at `size` pixels
    pub fn monospace(size: f32, line_height_ratio: f32) -> Self {
        let advance = 0.6 * size;
        let char_widths = (0u8..128)
            .map(|b| if (b as char).is_ascii_control() { 0.0 } else { advance })
            .collect();

        Self {
            size,
            line_height: size * line_height_ratio,
            char_widths,
            default_width: advance,
            wide_width: advance * 2.0,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if is_wide(c) {
            self.wide_width
        } else {
            self.default_width
        }
    }

    /// Width of one grapheme cluster
    pub fn grapheme_width(&self, grapheme: &str) -> f32 {
        if grapheme == "\t" {
            return self.width(' ') * 4.0;
        }
        // Combining marks and joiners ride on the base character
        grapheme.chars().next().map(|c| self.width(c)).unwrap_or(0.0)
    }

    /// Width of a run of text
    pub fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true).map(|g| self.grapheme_width(g)).sum()
    }
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF
        | 0x20000..=0x3FFFD)
}
