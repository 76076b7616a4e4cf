//! Text selection

use crate::editing::mapping::{Assoc, Mapping};

/// Text selection (anchor + head), as document positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// The anchor point (fixed during extension)
    pub anchor: usize,
    /// The head point (moves during extension)
    pub head: usize,
}

impl Selection {
    /// Create a new selection
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor)
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is collapsed (no text selected)
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get ordered start and end positions
    pub fn ordered(&self) -> (usize, usize) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    /// Map both ends through a document change
    pub fn map(&self, mapping: &Mapping) -> Self {
        Self {
            anchor: mapping.map(self.anchor, Assoc::After),
            head: mapping.map(self.head, Assoc::After),
        }
    }

    /// Clamp both ends into a document of the given size
    pub fn clamp(&self, size: usize) -> Self {
        Self {
            anchor: self.anchor.min(size),
            head: self.head.min(size),
        }
    }
}
