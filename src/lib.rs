//! Paper Editor: a paged rich-text editor core
//!
//! This crate provides:
//! - A block document with transactions, position mapping and mutation filters
//! - Live pagination that decorates the editing view with page breaks
//! - Offline page flow for read-only preview and PDF export
//! - Full undo/redo support that never records pagination

pub mod config;
pub mod document;
pub mod editing;
pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod session;
pub mod undo;
pub mod util;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use config::EditorConfig;
pub use document::{Block, BlockId, BlockKind, Document};
pub use editing::{Assoc, DocumentProtection, Mapping, MutationFilter, Selection, Step, Transaction};
pub use error::{EditorError, ExportError, HtmlError, StepError};
pub use export::{export_pdf, PageRasterizer, PrintBridge, SkiaRasterizer};
pub use layout::{
    flow, EstimatingOracle, LayoutOracle, PageDimensions, PageFormat, PageFragment,
    PaginationHost, PaginationState, Paginator, RenderSurface,
};
pub use render::{preview_html, render_preview, PreviewPage};
pub use session::EditorSession;
pub use undo::UndoManager;

use tracing::{debug, trace};

/// Editor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Editor rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Maximum number of undoable transactions
const HISTORY_DEPTH: usize = 100;

/// Handle returned by [`Editor::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What listeners see after a content change
#[derive(Debug)]
pub struct DocumentChange<'a> {
    pub version: u64,
    pub mapping: &'a Mapping,
    pub document: &'a Document,
}

type Listener = Box<dyn FnMut(&DocumentChange<'_>)>;

/// Result of [`Editor::dispatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// A mutation filter vetoed the transaction; nothing changed
    Rejected,
}

impl DispatchOutcome {
    pub fn is_applied(self) -> bool {
        self == DispatchOutcome::Applied
    }
}

/// The structured-document editor: sole owner of the document
pub struct Editor {
    document: Document,
    selection: Selection,
    undo_manager: UndoManager,
    filters: Vec<Box<dyn MutationFilter>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    pagination: PaginationState,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor holding one empty paragraph
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create an editor over an existing document
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            selection: Selection::default(),
            undo_manager: UndoManager::new(HISTORY_DEPTH),
            filters: vec![Box::new(DocumentProtection)],
            listeners: Vec::new(),
            next_subscription: 0,
            pagination: PaginationState::default(),
        }
    }

    /// Create an editor from HTML content
    pub fn from_html(html: &str) -> Result<Self, HtmlError> {
        Ok(Self::with_document(Document::from_html(html)?))
    }

    /// Apply a transaction.
    ///
    /// The steps run against a candidate copy of the document; every filter
    /// sees the candidate, and a single veto drops the whole transaction.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<DispatchOutcome, EditorError> {
        let (next, mapping) = tr.apply_to(&self.document)?;

        if let Some(filter) = self.filters.iter().find(|f| !f.allow(&tr, &next)) {
            debug!(
                filter = filter.name(),
                description = %tr.description,
                "Transaction rejected"
            );
            return Ok(DispatchOutcome::Rejected);
        }

        let doc_changed = tr.doc_changed();
        let selection_before = self.selection;
        let selection_after = match tr.selection {
            Some((anchor, head)) => Selection::new(anchor, head),
            None => self.selection.map(&mapping),
        }
        .clamp(next.content_size());

        if doc_changed && tr.meta.add_to_history {
            let inverse = tr.invert(&self.document)?;
            self.undo_manager.record(undo::HistoryEntry {
                description: tr.description.clone(),
                forward: tr.steps.clone(),
                inverse,
                selection_before,
                selection_after,
            });
        }

        self.pagination = self.pagination.apply(&tr, &mapping);
        self.selection = selection_after;
        self.document = next;

        trace!(
            description = %tr.description,
            steps = tr.steps.len(),
            version = self.document.version(),
            "Transaction applied"
        );

        if doc_changed {
            let change = DocumentChange {
                version: self.document.version(),
                mapping: &mapping,
                document: &self.document,
            };
            for (_, listener) in self.listeners.iter_mut() {
                listener(&change);
            }
        }

        Ok(DispatchOutcome::Applied)
    }

    /// Insert plain text at a position
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<DispatchOutcome, EditorError> {
        let step = Step::insert_text(pos, text);
        let end = match &step {
            Step::InsertText { text, .. } => pos + text.chars().count(),
            _ => pos,
        };
        self.dispatch(Transaction::new("insert").step(step).select(end, end))
    }

    /// Delete text between two positions inside one block
    pub fn delete_text(&mut self, from: usize, to: usize) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(
            Transaction::new("delete")
                .step(Step::delete_text(from, to))
                .select(from, from),
        )
    }

    /// Replace blocks `from..to` with new ones
    pub fn replace_blocks(
        &mut self,
        from: usize,
        to: usize,
        blocks: Vec<Block>,
    ) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Transaction::new("replace blocks").step(Step::replace_blocks(from, to, blocks)))
    }

    /// Replace the whole content with parsed HTML
    pub fn set_content(&mut self, html: &str) -> Result<DispatchOutcome, EditorError> {
        let parsed = Document::from_html(html)?;
        let blocks = parsed.blocks().to_vec();
        let len = self.document.block_count();
        self.dispatch(
            Transaction::new("set content")
                .step(Step::replace_blocks(0, len, blocks))
                .select(0, 0),
        )
    }

    /// Move the selection without touching content
    pub fn set_selection(&mut self, anchor: usize, head: usize) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Transaction::new("select").select(anchor, head))
    }

    /// Undo the last recorded transaction.
    ///
    /// Returns `false` if there was nothing to undo or a filter rejected it.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let Some(tr) = self.undo_manager.undo() else {
            return Ok(false);
        };
        match self.dispatch(tr) {
            Ok(DispatchOutcome::Applied) => Ok(true),
            Ok(DispatchOutcome::Rejected) => {
                self.undo_manager.restore_undo();
                Ok(false)
            }
            Err(err) => {
                self.undo_manager.restore_undo();
                Err(err)
            }
        }
    }

    /// Redo the last undone transaction
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let Some(tr) = self.undo_manager.redo() else {
            return Ok(false);
        };
        match self.dispatch(tr) {
            Ok(DispatchOutcome::Applied) => Ok(true),
            Ok(DispatchOutcome::Rejected) => {
                self.undo_manager.restore_redo();
                Ok(false)
            }
            Err(err) => {
                self.undo_manager.restore_redo();
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    /// Register a listener for content changes
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentChange<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Add a mutation filter, evaluated after the ones already registered
    pub fn add_filter(&mut self, filter: Box<dyn MutationFilter>) {
        self.filters.push(filter);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Decorations from the last pagination pass, mapped through later edits
    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.pagination.page_count
    }

    /// Serialized document content
    pub fn html(&self) -> String {
        self.document.to_html()
    }

    /// Document tree as JSON
    pub fn json(&self) -> serde_json::Value {
        self.document.to_json()
    }

    /// The editing view: content with page break widgets and placeholder
    pub fn decorated_html(&self, placeholder: &str) -> String {
        render::decorated_html(&self.document, &self.pagination, placeholder)
    }
}

impl PaginationHost for Editor {
    fn document(&self) -> &Document {
        &self.document
    }

    fn apply_pagination(&mut self, state: PaginationState) -> Result<(), EditorError> {
        let tr = Transaction::new("pagination")
            .without_history()
            .with_pagination(state);
        if !self.dispatch(tr)?.is_applied() {
            debug!("Pagination update rejected");
        }
        Ok(())
    }
}
