//! Live pagination for the editing view
//!
//! A pass walks the top-level blocks in document order, measuring each one
//! through a [`LayoutOracle`], and starts a new page before any block that
//! would overflow the current one. The result replaces the previous
//! [`PaginationState`] wholesale through a single meta-only transaction, so
//! pagination never shows up in the undo history and never changes content.

use crate::document::{BlockId, Document};
use crate::editing::{Assoc, Mapping, Transaction};
use crate::error::EditorError;
use crate::layout::dimensions::{
    PageDimensions, INITIAL_PAGINATION_DELAY_MS, PAGINATION_DEBOUNCE_MS,
};
use crate::layout::oracle::{BlockRef, LayoutOracle};
use crate::render::page_break_html;
use crate::util::{Clock, Debouncer};
use crate::{Editor, SubscriptionId};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// A page break decoration anchored right before a block
#[derive(Debug, Clone, PartialEq)]
pub struct PageBreakMarker {
    /// Document position the widget sits at
    pub pos: usize,
    /// Number of the page that ends at this break (1-based)
    pub page_number: usize,
    /// Block that starts the next page
    pub block_id: Option<BlockId>,
    pub dims: PageDimensions,
}

impl PageBreakMarker {
    /// Decoration key, unique within one pass
    pub fn key(&self) -> String {
        format!("page-break-{}", self.page_number)
    }

    /// Widget markup drawn between the two pages
    pub fn widget_html(&self) -> String {
        page_break_html(self.page_number, &self.dims)
    }
}

/// Decorations and page count from the last pagination pass
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub markers: Vec<PageBreakMarker>,
    pub page_count: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            page_count: 1,
        }
    }
}

impl PaginationState {
    /// State for a set of breaks in document order
    pub fn from_markers(markers: Vec<PageBreakMarker>) -> Self {
        let page_count = markers.len() + 1;
        Self {
            markers,
            page_count,
        }
    }

    /// Derive the state after a transaction.
    ///
    /// A transaction carrying pagination meta replaces the state; content
    /// changes move the markers along with the text around them until the
    /// next pass replaces them.
    pub fn apply(&self, tr: &Transaction, mapping: &Mapping) -> Self {
        if let Some(state) = &tr.meta.pagination {
            return state.clone();
        }
        if !tr.doc_changed() {
            return self.clone();
        }

        let markers = self
            .markers
            .iter()
            .map(|marker| PageBreakMarker {
                pos: mapping.map(marker.pos, Assoc::Before),
                ..marker.clone()
            })
            .collect();

        Self {
            markers,
            page_count: self.page_count,
        }
    }
}

/// The overflow rule shared by live pagination and offline flow.
///
/// A block starts a new page only when the current page already holds
/// something and the block both has height and does not fit.
pub fn breaks_before(current_height: f32, block_height: f32, usable_height: f32) -> bool {
    current_height > 0.0 && block_height > 0.0 && current_height + block_height > usable_height
}

/// Compute page breaks for every top-level block of a document
pub fn compute_page_breaks(
    doc: &Document,
    oracle: &dyn LayoutOracle,
    dims: &PageDimensions,
) -> PaginationState {
    let usable_height = dims.usable_height();
    let mut current_height = 0.0;
    let mut page_number = 1;
    let mut markers = Vec::new();

    for (pos, block) in doc.blocks_with_offsets() {
        let height = oracle.measure(&BlockRef {
            id: Some(block.id),
            pos,
            html: Cow::Owned(block.outer_html()),
        });

        if breaks_before(current_height, height, usable_height) {
            trace!(pos, page = page_number, "Page break");
            markers.push(PageBreakMarker {
                pos,
                page_number,
                block_id: Some(block.id),
                dims: *dims,
            });
            page_number += 1;
            current_height = height;
        } else {
            current_height += height;
        }
    }

    PaginationState::from_markers(markers)
}

/// Minimum height of the paper so every page and the gaps between them fit
pub fn canvas_min_height(page_count: usize, dims: &PageDimensions) -> f32 {
    let pages = page_count.max(1) as f32;
    pages * dims.height + (pages - 1.0) * dims.break_height()
}

/// The narrow capability pagination needs from an editor
pub trait PaginationHost {
    /// Current document
    fn document(&self) -> &Document;

    /// Replace the decorations through a meta-only, non-history mutation
    fn apply_pagination(&mut self, state: PaginationState) -> Result<(), EditorError>;
}

/// Drives pagination passes for one editing session
pub struct Paginator {
    dims: PageDimensions,
    clock: Rc<dyn Clock>,
    debouncer: Rc<RefCell<Debouncer>>,
    subscription: Option<SubscriptionId>,
    canvas_min_height: f32,
    passes: u64,
}

impl Paginator {
    /// Subscribe to an editor's content changes and schedule the first pass
    pub fn attach(editor: &mut Editor, dims: PageDimensions, clock: Rc<dyn Clock>) -> Self {
        let debouncer = Rc::new(RefCell::new(Debouncer::new(PAGINATION_DEBOUNCE_MS)));
        debouncer
            .borrow_mut()
            .trigger_after(clock.now_ms(), INITIAL_PAGINATION_DELAY_MS);

        let trigger = Rc::clone(&debouncer);
        let trigger_clock = Rc::clone(&clock);
        let subscription = editor.subscribe(move |_change| {
            trigger.borrow_mut().trigger(trigger_clock.now_ms());
        });

        debug!(width = dims.width, height = dims.height, "Pagination attached");

        Self {
            dims,
            clock,
            debouncer,
            subscription: Some(subscription),
            canvas_min_height: dims.height,
            passes: 0,
        }
    }

    pub fn dims(&self) -> &PageDimensions {
        &self.dims
    }

    /// Something changed size: debounce a pass
    pub fn notify_resize(&self) {
        self.debouncer.borrow_mut().trigger(self.clock.now_ms());
    }

    /// A pass is scheduled
    pub fn is_pending(&self) -> bool {
        self.debouncer.borrow().is_pending()
    }

    /// Milliseconds until the scheduled pass is due
    pub fn next_due_in(&self) -> Option<u64> {
        self.debouncer.borrow().remaining_ms(self.clock.now_ms())
    }

    /// Run the scheduled pass if its quiet period has elapsed.
    ///
    /// Returns `true` if a pass ran.
    pub fn poll<H>(&mut self, host: &mut H, oracle: &dyn LayoutOracle) -> Result<bool, EditorError>
    where
        H: PaginationHost + ?Sized,
    {
        let due = self.debouncer.borrow_mut().poll(self.clock.now_ms());
        if !due {
            return Ok(false);
        }
        Ok(self.recalculate(host, oracle)?.is_some())
    }

    /// Run a pass now.
    ///
    /// Nothing happens while the surface is not connected.
    pub fn recalculate<H>(
        &mut self,
        host: &mut H,
        oracle: &dyn LayoutOracle,
    ) -> Result<Option<PaginationState>, EditorError>
    where
        H: PaginationHost + ?Sized,
    {
        if !oracle.is_connected() {
            debug!("Surface not connected, skipping pagination pass");
            return Ok(None);
        }

        let state = compute_page_breaks(host.document(), oracle, &self.dims);
        self.canvas_min_height = canvas_min_height(state.page_count, &self.dims);
        self.passes += 1;

        debug!(
            pages = state.page_count,
            min_height = self.canvas_min_height,
            pass = self.passes,
            "Pagination pass"
        );

        host.apply_pagination(state.clone())?;
        Ok(Some(state))
    }

    /// Minimum paper height from the last pass
    pub fn canvas_min_height(&self) -> f32 {
        self.canvas_min_height
    }

    /// Number of passes that ran
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Unsubscribe and cancel any scheduled pass
    pub fn detach(&mut self, editor: &mut Editor) {
        self.debouncer.borrow_mut().cancel();
        if let Some(id) = self.subscription.take() {
            editor.unsubscribe(id);
            debug!("Pagination detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::editing::{Step, Transaction};
    use crate::layout::dimensions::A4;
    use crate::util::ManualClock;

    /// Heights by block id
    struct FixedHeights(Vec<f32>);

    impl LayoutOracle for FixedHeights {
        fn measure(&self, block: &BlockRef<'_>) -> f32 {
            block
                .id
                .and_then(|id| self.0.get(id.0 as usize))
                .copied()
                .unwrap_or(0.0)
        }
    }

    struct Disconnected;

    impl LayoutOracle for Disconnected {
        fn measure(&self, _block: &BlockRef<'_>) -> f32 {
            100.0
        }

        fn is_connected(&self) -> bool {
            false
        }
    }

    fn doc(blocks: usize) -> Document {
        Document::from_blocks((0..blocks).map(|i| Block::paragraph(&format!("block {}", i))))
    }

    #[test]
    fn test_three_blocks_of_400_make_two_pages() {
        let doc = doc(3);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![400.0; 3]), &A4);

        assert_eq!(state.page_count, 2);
        assert_eq!(state.markers.len(), 1);
        assert_eq!(state.markers[0].pos, doc.block_start(2));
        assert_eq!(state.markers[0].page_number, 1);
        assert_eq!(state.markers[0].key(), "page-break-1");
    }

    #[test]
    fn test_first_block_never_breaks() {
        let doc = doc(2);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![2000.0, 100.0]), &A4);

        assert_eq!(state.page_count, 2);
        assert_eq!(state.markers[0].pos, doc.block_start(1));
    }

    #[test]
    fn test_zero_height_blocks_never_break() {
        let doc = doc(4);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![1000.0, 0.0, 0.0, 50.0]), &A4);

        assert_eq!(state.markers.len(), 1);
        assert_eq!(state.markers[0].pos, doc.block_start(3));
    }

    #[test]
    fn test_page_numbers_increase_by_one() {
        let doc = doc(12);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![500.0; 12]), &A4);

        assert_eq!(state.page_count, state.markers.len() + 1);
        assert_eq!(state.markers.len(), 11);
        for (i, marker) in state.markers.iter().enumerate() {
            assert_eq!(marker.page_number, i + 1);
        }
        assert!(state.markers.windows(2).all(|w| w[0].pos < w[1].pos));
    }

    #[test]
    fn test_empty_document_is_one_page() {
        let state = compute_page_breaks(&Document::empty(), &FixedHeights(Vec::new()), &A4);
        assert_eq!(state, PaginationState::default());
    }

    #[test]
    fn test_canvas_min_height() {
        assert_eq!(canvas_min_height(1, &A4), 1123.0);
        assert_eq!(canvas_min_height(2, &A4), 2.0 * 1123.0 + 96.0 + 40.0 + 96.0);
        assert_eq!(canvas_min_height(0, &A4), 1123.0);
    }

    #[test]
    fn test_state_replaced_by_meta() {
        let old = PaginationState::default();
        let new = PaginationState::from_markers(vec![PageBreakMarker {
            pos: 4,
            page_number: 1,
            block_id: None,
            dims: A4,
        }]);
        let tr = Transaction::new("paginate")
            .without_history()
            .with_pagination(new.clone());

        assert_eq!(old.apply(&tr, &Mapping::new()), new);
    }

    #[test]
    fn test_markers_follow_content_changes() {
        let doc = doc(3);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![400.0; 3]), &A4);
        let before = state.markers[0].pos;

        let tr = Transaction::new("type").step(Step::insert_text(1, "abc"));
        let (_, mapping) = tr.apply_to(&doc).unwrap();
        let mapped = state.apply(&tr, &mapping);

        assert_eq!(mapped.markers[0].pos, before + 3);
        assert_eq!(mapped.page_count, 2);

        let selection_only = Transaction::new("select").select(1, 1);
        assert_eq!(state.apply(&selection_only, &Mapping::new()), state);
    }

    #[test]
    fn test_marker_stays_before_inserted_block() {
        let doc = doc(3);
        let state = compute_page_breaks(&doc, &FixedHeights(vec![400.0; 3]), &A4);
        let pos = state.markers[0].pos;

        let tr = Transaction::new("insert block")
            .step(Step::replace_blocks(2, 2, vec![Block::paragraph("new")]));
        let (_, mapping) = tr.apply_to(&doc).unwrap();

        assert_eq!(state.apply(&tr, &mapping).markers[0].pos, pos);
    }

    #[test]
    fn test_initial_pass_after_mount() {
        let clock = Rc::new(ManualClock::new(1_000));
        let mut editor = Editor::with_document(doc(3));
        let mut paginator = Paginator::attach(&mut editor, A4, clock.clone());
        let oracle = FixedHeights(vec![400.0; 3]);

        clock.advance(49);
        assert!(!paginator.poll(&mut editor, &oracle).unwrap());
        clock.advance(1);
        assert!(paginator.poll(&mut editor, &oracle).unwrap());

        assert_eq!(editor.page_count(), 2);
        assert_eq!(paginator.canvas_min_height(), canvas_min_height(2, &A4));
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_rapid_changes_collapse_into_one_pass() {
        let clock = Rc::new(ManualClock::new(0));
        let mut editor = Editor::with_document(doc(3));
        let mut paginator = Paginator::attach(&mut editor, A4, clock.clone());
        let oracle = FixedHeights(vec![400.0; 3]);

        clock.advance(50);
        paginator.poll(&mut editor, &oracle).unwrap();
        assert_eq!(paginator.passes(), 1);

        for _ in 0..5 {
            editor.insert_text(1, "x").unwrap();
            clock.advance(20);
            assert!(!paginator.poll(&mut editor, &oracle).unwrap());
        }

        clock.advance(100);
        assert!(paginator.poll(&mut editor, &oracle).unwrap());
        assert!(!paginator.poll(&mut editor, &oracle).unwrap());
        assert_eq!(paginator.passes(), 2);

        // The pass saw the state after the last edit
        let marker = &editor.pagination().markers[0];
        assert_eq!(marker.pos, editor.document().block_start(2));
    }

    #[test]
    fn test_pass_skipped_while_disconnected() {
        let clock = Rc::new(ManualClock::new(0));
        let mut editor = Editor::with_document(doc(3));
        let mut paginator = Paginator::attach(&mut editor, A4, clock.clone());

        clock.advance(50);
        assert!(!paginator.poll(&mut editor, &Disconnected).unwrap());
        assert_eq!(paginator.passes(), 0);
        assert_eq!(editor.page_count(), 1);
    }

    #[test]
    fn test_resize_schedules_pass() {
        let clock = Rc::new(ManualClock::new(0));
        let mut editor = Editor::with_document(doc(1));
        let mut paginator = Paginator::attach(&mut editor, A4, clock.clone());
        let oracle = FixedHeights(vec![10.0]);

        clock.advance(50);
        paginator.poll(&mut editor, &oracle).unwrap();
        assert!(!paginator.is_pending());

        paginator.notify_resize();
        assert_eq!(paginator.next_due_in(), Some(100));
        clock.advance(100);
        assert!(paginator.poll(&mut editor, &oracle).unwrap());
    }

    #[test]
    fn test_detach_cancels_and_unsubscribes() {
        let clock = Rc::new(ManualClock::new(0));
        let mut editor = Editor::with_document(doc(2));
        let mut paginator = Paginator::attach(&mut editor, A4, clock.clone());
        let oracle = FixedHeights(vec![10.0, 10.0]);

        paginator.detach(&mut editor);
        assert!(!paginator.is_attached());
        assert!(!paginator.is_pending());

        editor.insert_text(1, "x").unwrap();
        assert!(!paginator.is_pending());
        clock.advance(1_000);
        assert!(!paginator.poll(&mut editor, &oracle).unwrap());
        assert_eq!(editor.listener_count(), 0);
    }
}
