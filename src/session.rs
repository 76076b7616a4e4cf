//! Editing session
//!
//! Owns the editor once mounted, wires live pagination to it and exposes the
//! handful of operations a host needs: content snapshots, page count, PDF
//! export and printing. Hosts drive time by calling [`EditorSession::tick`].

use crate::config::EditorConfig;
use crate::document::{BlockId, Document};
use crate::error::EditorError;
use crate::export::{self, PageRasterizer, PrintBridge, EXPORT_SCALE};
use crate::layout::{BoxMetrics, EstimatingOracle, LayoutOracle, PageDimensions, Paginator, RenderSurface};
use crate::util::{Clock, SystemClock};
use crate::Editor;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

/// How blocks are measured for live pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureMode {
    /// Box metrics reported by the host's rendering surface
    #[default]
    Surface,
    /// Headless estimation from the block markup
    Estimate,
}

type ChangeCallback = Box<dyn FnMut(&str, &Value)>;

struct Mounted {
    editor: Editor,
    paginator: Option<Paginator>,
    surface: RenderSurface,
    estimator: EstimatingOracle,
}

/// One editor instance from mount to destroy
pub struct EditorSession {
    config: EditorConfig,
    dims: PageDimensions,
    clock: Rc<dyn Clock>,
    mode: MeasureMode,
    on_change: Rc<RefCell<Option<ChangeCallback>>>,
    mounted: Option<Mounted>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Rc<dyn Clock>) -> Self {
        let dims = config.dimensions();
        Self {
            config,
            dims,
            clock,
            mode: MeasureMode::default(),
            on_change: Rc::new(RefCell::new(None)),
            mounted: None,
        }
    }

    /// Choose how blocks are measured
    pub fn with_measure_mode(mut self, mode: MeasureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn dims(&self) -> &PageDimensions {
        &self.dims
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Create the editor from the configured initial content and start
    /// pagination. Mounting again replaces the previous editor.
    pub fn mount(&mut self) -> Result<(), EditorError> {
        if self.mounted.is_some() {
            self.destroy();
        }

        let mut editor = Editor::from_html(&self.config.initial_content)?;
        if editor.document().is_empty() {
            editor = Editor::with_document(Document::new());
        }

        let callback = Rc::clone(&self.on_change);
        editor.subscribe(move |change| {
            if let Some(on_change) = callback.borrow_mut().as_mut() {
                let html = change.document.to_html();
                let json = change.document.to_json();
                on_change(&html, &json);
            }
        });

        let paginator = self
            .config
            .pagination
            .then(|| Paginator::attach(&mut editor, self.dims, Rc::clone(&self.clock)));

        let mut surface = RenderSurface::new();
        surface.connect();

        info!(
            format = %self.config.page_format,
            pagination = self.config.pagination,
            blocks = editor.document().block_count(),
            "Editor mounted"
        );

        self.mounted = Some(Mounted {
            editor,
            paginator,
            surface,
            estimator: EstimatingOracle::new(self.dims.usable_width()),
        });
        Ok(())
    }

    /// Tear the editor down: stop pagination, drop listeners and measurements
    pub fn destroy(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            if let Some(paginator) = mounted.paginator.as_mut() {
                paginator.detach(&mut mounted.editor);
            }
            mounted.surface.clear();
            debug!("Editor destroyed");
        }
    }

    /// Called with `(html, json)` after every content change
    pub fn set_on_change(&mut self, callback: impl FnMut(&str, &Value) + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(callback));
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.mounted.as_ref().map(|m| &m.editor)
    }

    pub fn editor_mut(&mut self) -> Result<&mut Editor, EditorError> {
        self.mounted
            .as_mut()
            .map(|m| &mut m.editor)
            .ok_or(EditorError::NotInitialized)
    }

    /// Current HTML, or an empty string before mount
    pub fn html(&self) -> String {
        self.editor().map(Editor::html).unwrap_or_default()
    }

    /// Current document tree, or an empty doc before mount
    pub fn json(&self) -> Value {
        match self.editor() {
            Some(editor) => editor.json(),
            None => Document::empty().to_json(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.editor().map_or(1, Editor::page_count)
    }

    /// Minimum height of the paper canvas from the last pass
    pub fn canvas_min_height(&self) -> f32 {
        self.mounted
            .as_ref()
            .and_then(|m| m.paginator.as_ref())
            .map_or(self.dims.height, Paginator::canvas_min_height)
    }

    /// The editing view with page break widgets and placeholder
    pub fn decorated_html(&self) -> String {
        self.editor()
            .map(|editor| editor.decorated_html(&self.config.placeholder))
            .unwrap_or_default()
    }

    /// Run pagination if a pass is due. Returns `true` if one ran.
    pub fn tick(&mut self) -> Result<bool, EditorError> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(false);
        };
        let Some(paginator) = mounted.paginator.as_mut() else {
            return Ok(false);
        };
        let oracle: &dyn LayoutOracle = match self.mode {
            MeasureMode::Surface => &mounted.surface,
            MeasureMode::Estimate => &mounted.estimator,
        };
        let ran = paginator.poll(&mut mounted.editor, oracle)?;
        if ran {
            let live = mounted.editor.document().blocks().iter().map(|b| b.id);
            mounted.surface.retain(live);
            mounted.surface.set_min_height(paginator.canvas_min_height());
        }
        Ok(ran)
    }

    /// Minimum height the host should give the paper element
    pub fn surface_min_height(&self) -> f32 {
        self.mounted
            .as_ref()
            .map_or(self.dims.height, |m| m.surface.min_height().max(self.dims.height))
    }

    /// Milliseconds until the next pagination pass, if one is scheduled
    pub fn next_tick_in(&self) -> Option<u64> {
        self.mounted
            .as_ref()
            .and_then(|m| m.paginator.as_ref())
            .and_then(Paginator::next_due_in)
    }

    /// The editing surface changed size
    pub fn notify_resize(&mut self) {
        if let Some(paginator) = self.mounted.as_ref().and_then(|m| m.paginator.as_ref()) {
            paginator.notify_resize();
        }
    }

    /// Attach or detach the host's rendering surface
    pub fn set_surface_connected(&mut self, connected: bool) {
        if let Some(mounted) = self.mounted.as_mut() {
            if connected {
                mounted.surface.connect();
            } else {
                mounted.surface.disconnect();
            }
        }
    }

    /// Record a block's rendered box. A changed box schedules a pass.
    pub fn report_block_box(&mut self, id: BlockId, metrics: BoxMetrics) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if mounted.surface.report(id, metrics) {
            if let Some(paginator) = mounted.paginator.as_ref() {
                paginator.notify_resize();
            }
        }
    }

    /// Export the current content as a PDF
    pub fn export_pdf(&self, rasterizer: &mut dyn PageRasterizer) -> Result<Vec<u8>, EditorError> {
        let editor = self.editor().ok_or(EditorError::NotInitialized)?;
        Ok(export::export_pdf(&editor.html(), &self.dims, rasterizer, EXPORT_SCALE)?)
    }

    /// Open the native print flow
    pub fn print(&self, bridge: &mut dyn PrintBridge) -> Result<(), EditorError> {
        if self.mounted.is_none() {
            return Err(EditorError::NotInitialized);
        }
        Ok(bridge.print()?)
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.destroy();
    }
}
