//! Page formats and their dimensions
//!
//! All lengths are CSS pixels at 96 per inch.

use crate::error::ParseFormatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CSS pixels per inch
pub const PX_PER_INCH: f32 = 96.0;

/// Millimetres per inch
pub const MM_PER_INCH: f32 = 25.4;

/// PDF points per inch
pub const PT_PER_INCH: f32 = 72.0;

/// Gap between pages in the editing view
pub const PAGE_GAP: f32 = 40.0;

/// Quiet period before a pagination pass runs
pub const PAGINATION_DEBOUNCE_MS: u64 = 100;

/// Delay of the first pagination pass after mount
pub const INITIAL_PAGINATION_DELAY_MS: u64 = 50;

/// Supported page formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// All formats, in lookup order
    pub const ALL: [PageFormat; 2] = [PageFormat::A4, PageFormat::Letter];

    /// Dimensions of this format
    pub fn dimensions(self) -> PageDimensions {
        match self {
            PageFormat::A4 => A4,
            PageFormat::Letter => LETTER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageFormat::A4 => "a4",
            PageFormat::Letter => "letter",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Page margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    /// The same margin on every side
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }
}

/// Size and margins of one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub margin: Margins,
}

/// A4: 210mm x 297mm, one inch margins
pub const A4: PageDimensions = PageDimensions {
    width: 794.0,
    height: 1123.0,
    margin: Margins::uniform(PX_PER_INCH),
};

/// US Letter: 8.5in x 11in, one inch margins
pub const LETTER: PageDimensions = PageDimensions {
    width: 816.0,
    height: 1056.0,
    margin: Margins::uniform(PX_PER_INCH),
};

/// Every supported format with its dimensions
pub const PAGE_FORMATS: [(PageFormat, PageDimensions); 2] =
    [(PageFormat::A4, A4), (PageFormat::Letter, LETTER)];

impl Default for PageDimensions {
    fn default() -> Self {
        A4
    }
}

impl PageDimensions {
    /// Width available to content
    pub fn usable_width(&self) -> f32 {
        self.width - self.margin.left - self.margin.right
    }

    /// Height available to content on each page
    pub fn usable_height(&self) -> f32 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Check that the margins leave a positive content area
    pub fn is_valid(&self) -> bool {
        self.usable_width() > 0.0 && self.usable_height() > 0.0
    }

    /// Page size in millimetres
    pub fn size_mm(&self) -> (f32, f32) {
        (px_to_mm(self.width), px_to_mm(self.height))
    }

    /// Page size in PDF points
    pub fn size_pt(&self) -> (f32, f32) {
        (px_to_pt(self.width), px_to_pt(self.height))
    }

    /// Height of the decoration between two pages in the editing view
    pub fn break_height(&self) -> f32 {
        self.margin.bottom + PAGE_GAP + self.margin.top
    }
}

pub fn px_to_mm(px: f32) -> f32 {
    px / PX_PER_INCH * MM_PER_INCH
}

pub fn px_to_pt(px: f32) -> f32 {
    px / PX_PER_INCH * PT_PER_INCH
}
