//! Block height measurement
//!
//! Pagination never looks at pixels itself. It asks a [`LayoutOracle`] how
//! much vertical space a block occupies, margins included. Blocks the oracle
//! cannot see measure `0`, which the break rule treats as "never breaks".

use crate::document::BlockId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::borrow::Cow;

/// A top-level block handed to an oracle
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRef<'a> {
    /// Stable block identity, when the block lives in an editor document
    pub id: Option<BlockId>,
    /// Position of the block: document position in the editor, source byte
    /// offset in offline flow
    pub pos: usize,
    /// Outer HTML of the block
    pub html: Cow<'a, str>,
}

/// Answers "how tall is this block as rendered"
pub trait LayoutOracle {
    /// Full box height including vertical margins, `0` if not rendered
    fn measure(&self, block: &BlockRef<'_>) -> f32;

    /// Whether the surface behind the oracle is attached and laid out
    fn is_connected(&self) -> bool {
        true
    }
}

impl<T: LayoutOracle + ?Sized> LayoutOracle for &T {
    fn measure(&self, block: &BlockRef<'_>) -> f32 {
        (**self).measure(block)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Box metrics of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxMetrics {
    /// Border-box height
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl BoxMetrics {
    pub fn new(height: f32, margin_top: f32, margin_bottom: f32) -> Self {
        Self {
            height,
            margin_top,
            margin_bottom,
        }
    }

    /// Height including vertical margins
    pub fn outer_height(&self) -> f32 {
        self.height + self.margin_top + self.margin_bottom
    }
}

/// Live rendering surface: the host reports the laid out box of each block
#[derive(Debug, Default)]
pub struct RenderSurface {
    boxes: FxHashMap<BlockId, BoxMetrics>,
    connected: bool,
    /// Minimum height pushed onto the paper element
    min_height: f32,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The surface is attached to a live view
    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// The surface was removed from the view
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Record the laid out box of a block.
    ///
    /// Returns `true` if the box changed size, which counts as a resize.
    pub fn report(&mut self, id: BlockId, metrics: BoxMetrics) -> bool {
        match self.boxes.insert(id, metrics) {
            Some(previous) => previous != metrics,
            None => true,
        }
    }

    /// Drop boxes of blocks not in `live`
    pub fn retain<I: IntoIterator<Item = BlockId>>(&mut self, live: I) {
        let live: FxHashSet<BlockId> = live.into_iter().collect();
        self.boxes.retain(|id, _| live.contains(id));
    }

    /// Get the reported box of a block
    pub fn box_of(&self, id: BlockId) -> Option<BoxMetrics> {
        self.boxes.get(&id).copied()
    }

    pub fn set_min_height(&mut self, height: f32) {
        self.min_height = height;
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.min_height = 0.0;
    }
}

impl LayoutOracle for RenderSurface {
    fn measure(&self, block: &BlockRef<'_>) -> f32 {
        block
            .id
            .and_then(|id| self.boxes.get(&id))
            .map(BoxMetrics::outer_height)
            .unwrap_or(0.0)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: u64) -> BlockRef<'static> {
        BlockRef {
            id: Some(BlockId(id)),
            pos: 0,
            html: Cow::Borrowed("<p></p>"),
        }
    }

    #[test]
    fn test_reported_box_includes_margins() {
        let mut surface = RenderSurface::new();
        surface.report(BlockId(1), BoxMetrics::new(100.0, 8.0, 12.0));
        assert_eq!(surface.measure(&block(1)), 120.0);
    }

    #[test]
    fn test_unrendered_block_measures_zero() {
        let surface = RenderSurface::new();
        assert_eq!(surface.measure(&block(7)), 0.0);

        let anonymous = BlockRef {
            id: None,
            pos: 0,
            html: Cow::Borrowed("<p>x</p>"),
        };
        assert_eq!(surface.measure(&anonymous), 0.0);
    }

    #[test]
    fn test_report_detects_resize() {
        let mut surface = RenderSurface::new();
        assert!(surface.report(BlockId(1), BoxMetrics::new(10.0, 0.0, 0.0)));
        assert!(!surface.report(BlockId(1), BoxMetrics::new(10.0, 0.0, 0.0)));
        assert!(surface.report(BlockId(1), BoxMetrics::new(240.0, 0.0, 0.0)));
    }

    #[test]
    fn test_retain_prunes_removed_blocks() {
        let mut surface = RenderSurface::new();
        surface.report(BlockId(1), BoxMetrics::new(10.0, 0.0, 0.0));
        surface.report(BlockId(2), BoxMetrics::new(10.0, 0.0, 0.0));
        surface.retain([BlockId(2)]);
        assert!(surface.box_of(BlockId(1)).is_none());
        assert!(surface.box_of(BlockId(2)).is_some());
    }

    #[test]
    fn test_connection_state() {
        let mut surface = RenderSurface::new();
        assert!(!surface.is_connected());
        surface.connect();
        assert!((&surface).is_connected());
        surface.disconnect();
        assert!(!surface.is_connected());
    }
}
