//! WASM bindings for the editor

use crate::config::EditorConfig;
use crate::document::BlockId;
use crate::error::ExportError;
use crate::export::{print_stylesheet, PageRasterizer, PrintBridge, RasterPage, SkiaRasterizer};
use crate::layout::{BoxMetrics, PageDimensions, PageFormat, PageFragment};
use crate::render::render_preview;
use crate::session::{EditorSession, MeasureMode};
use js_sys::{Function, Promise, Reflect, Uint8Array, JSON};
use tracing::warn;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

/// Rasterizer that hands each page to a host callback.
///
/// The callback receives `(pageNumber, html, widthPx, heightPx, scale)` and
/// must return the page as PNG bytes synchronously. A returned Promise fails
/// the export.
pub struct JsRasterizer {
    callback: Function,
}

impl JsRasterizer {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl PageRasterizer for JsRasterizer {
    fn rasterize(
        &mut self,
        page: usize,
        fragment: &PageFragment,
        dims: &PageDimensions,
        scale: f32,
    ) -> Result<RasterPage, ExportError> {
        let args = js_sys::Array::of5(
            &JsValue::from(page as u32),
            &JsValue::from_str(&fragment.html),
            &JsValue::from(dims.width),
            &JsValue::from(dims.height),
            &JsValue::from(scale),
        );
        let result = self
            .callback
            .apply(&JsValue::NULL, &args)
            .map_err(|err| ExportError::Rasterize {
                page,
                reason: err.as_string().unwrap_or_else(|| "rasterizer threw".to_string()),
            })?;
        if result.is_instance_of::<Promise>() {
            return Err(ExportError::Rasterize {
                page,
                reason: "rasterizer returned a Promise, expected PNG bytes".to_string(),
            });
        }
        let bytes = Uint8Array::new(&result).to_vec();
        RasterPage::from_png(&bytes)
    }
}

/// Print bridge calling the global `print()`
pub struct WindowPrint;

impl PrintBridge for WindowPrint {
    fn print(&mut self) -> Result<(), ExportError> {
        let print = Reflect::get(&js_sys::global(), &JsValue::from_str("print"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or(ExportError::Unsupported("window.print"))?;
        print
            .call0(&JsValue::NULL)
            .map(|_| ())
            .map_err(|_| ExportError::Unsupported("window.print"))
    }
}

/// WASM-exposed editor session
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor from a JSON config (`pageFormat`, `pagination`,
    /// `placeholder`, `initialContent`). Call `mount` to start it.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WasmEditor, JsError> {
        let config = match config {
            Some(json) => EditorConfig::from_json(&json)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            session: EditorSession::new(config),
        })
    }

    /// Measure blocks headlessly instead of from reported boxes
    #[wasm_bindgen(js_name = useEstimatedLayout)]
    pub fn use_estimated_layout(self) -> WasmEditor {
        Self {
            session: self.session.with_measure_mode(MeasureMode::Estimate),
        }
    }

    pub fn mount(&mut self) -> Result<(), JsError> {
        Ok(self.session.mount()?)
    }

    pub fn destroy(&mut self) {
        self.session.destroy();
    }

    /// Register `(html, json) => void`, called after every content change
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&mut self, callback: Function) {
        self.session.set_on_change(move |html, json| {
            if let Err(err) = callback.call2(&JsValue::NULL, &JsValue::from_str(html), &to_js(json)) {
                warn!(error = ?err, "onChange callback threw");
            }
        });
    }

    #[wasm_bindgen(js_name = getHTML)]
    pub fn get_html(&self) -> String {
        self.session.html()
    }

    #[wasm_bindgen(js_name = getJSON)]
    pub fn get_json(&self) -> JsValue {
        to_js(&self.session.json())
    }

    /// Content with page break widgets, for the editing view
    #[wasm_bindgen(js_name = getDecoratedHTML)]
    pub fn get_decorated_html(&self) -> String {
        self.session.decorated_html()
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.session.page_count()
    }

    #[wasm_bindgen(js_name = getCanvasMinHeight)]
    pub fn get_canvas_min_height(&self) -> f32 {
        self.session.canvas_min_height()
    }

    /// Run a due pagination pass. Returns whether one ran.
    pub fn tick(&mut self) -> Result<bool, JsError> {
        Ok(self.session.tick()?)
    }

    /// Milliseconds until the next pass, or undefined
    #[wasm_bindgen(js_name = nextTickIn)]
    pub fn next_tick_in(&self) -> Option<f64> {
        self.session.next_tick_in().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = notifyResize)]
    pub fn notify_resize(&mut self) {
        self.session.notify_resize();
    }

    #[wasm_bindgen(js_name = setSurfaceConnected)]
    pub fn set_surface_connected(&mut self, connected: bool) {
        self.session.set_surface_connected(connected);
    }

    /// Report the laid out box of a block
    #[wasm_bindgen(js_name = reportBlockBox)]
    pub fn report_block_box(&mut self, block_id: f64, height: f32, margin_top: f32, margin_bottom: f32) {
        self.session.report_block_box(
            BlockId(block_id as u64),
            BoxMetrics::new(height, margin_top, margin_bottom),
        );
    }

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<bool, JsError> {
        Ok(self.session.editor_mut()?.insert_text(pos, text)?.is_applied())
    }

    #[wasm_bindgen(js_name = deleteText)]
    pub fn delete_text(&mut self, from: usize, to: usize) -> Result<bool, JsError> {
        Ok(self.session.editor_mut()?.delete_text(from, to)?.is_applied())
    }

    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, html: &str) -> Result<bool, JsError> {
        Ok(self.session.editor_mut()?.set_content(html)?.is_applied())
    }

    pub fn undo(&mut self) -> Result<bool, JsError> {
        Ok(self.session.editor_mut()?.undo()?)
    }

    pub fn redo(&mut self) -> Result<bool, JsError> {
        Ok(self.session.editor_mut()?.redo()?)
    }

    /// Export as PDF bytes. Pages are rendered by `rasterize` when given,
    /// otherwise by the built-in wireframe rasterizer.
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&self, rasterize: Option<Function>) -> Result<Vec<u8>, JsError> {
        let bytes = match rasterize {
            Some(callback) => self.session.export_pdf(&mut JsRasterizer::new(callback))?,
            None => self.session.export_pdf(&mut SkiaRasterizer::new())?,
        };
        Ok(bytes)
    }

    pub fn print(&self) -> Result<(), JsError> {
        Ok(self.session.print(&mut WindowPrint)?)
    }

    /// `@page` rules for the configured format
    #[wasm_bindgen(js_name = printStylesheet)]
    pub fn print_stylesheet(&self) -> String {
        print_stylesheet(self.session.dims())
    }
}

/// Split content into preview pages (`[{number, total, content, html}]`)
#[wasm_bindgen(js_name = renderPreview)]
pub fn render_preview_js(content: &str, format: Option<String>) -> Result<JsValue, JsError> {
    let format = match format {
        Some(name) => name.parse::<PageFormat>()?,
        None => PageFormat::default(),
    };
    Ok(to_js(&render_preview(content, format)))
}
