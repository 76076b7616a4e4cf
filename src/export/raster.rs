//! Page rasterization for export
//!
//! Each page fragment becomes an opaque RGB bitmap the size of the whole
//! page (margins included) at the export scale. The built-in
//! [`SkiaRasterizer`] paints the estimator's display list as a wireframe:
//! text lines become grey bars, images placeholder boxes. Hosts with a real
//! renderer plug in their own [`PageRasterizer`].

use crate::document::html::{self, HtmlNode};
use crate::error::ExportError;
use crate::layout::{EstimatingOracle, PageDimensions, PageFragment};
use crate::render::{DisplayItem, DisplayPage, FrameStyle, ListMarkerDisplay};
use crate::Point;
use image::ImageFormat;
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};
use tracing::trace;

/// Pixel density of exported pages
pub const EXPORT_SCALE: f32 = 2.0;

/// An opaque RGB bitmap of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    pub width: u32,
    pub height: u32,
    /// Row-major, 3 bytes per pixel
    pub rgb: Vec<u8>,
}

impl RasterPage {
    /// Decode a PNG produced by a host renderer
    pub fn from_png(bytes: &[u8]) -> Result<Self, ExportError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgb8();
        Ok(Self {
            width: image.width(),
            height: image.height(),
            rgb: image.into_raw(),
        })
    }

    /// Check the bitmap is usable as page `page`
    pub fn validate(&self, page: usize) -> Result<(), ExportError> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::Rasterize {
                page,
                reason: "empty bitmap".to_string(),
            });
        }
        let expected = self.width as usize * self.height as usize * 3;
        if self.rgb.len() != expected {
            return Err(ExportError::RasterSize {
                page,
                expected,
                got: self.rgb.len(),
            });
        }
        Ok(())
    }
}

/// Turns one page fragment into a bitmap
pub trait PageRasterizer {
    /// Rasterize page `page` (1-based) at `scale` pixels per CSS pixel
    fn rasterize(
        &mut self,
        page: usize,
        fragment: &PageFragment,
        dims: &PageDimensions,
        scale: f32,
    ) -> Result<RasterPage, ExportError>;
}

/// Wireframe rasterizer built on `tiny-skia`
#[derive(Debug, Default)]
pub struct SkiaRasterizer;

impl SkiaRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Lay the fragment out on a page
    fn layout(fragment: &PageFragment, dims: &PageDimensions) -> Result<DisplayPage, String> {
        let nodes = html::parse_fragment(&fragment.html).map_err(|err| err.to_string())?;
        let oracle = EstimatingOracle::new(dims.usable_width());

        let mut page = DisplayPage::new(0, dims.width, dims.height);
        let blocks = nodes
            .iter()
            .filter(|top| !matches!(&top.node, HtmlNode::Element(el) if el.has_class("rte-page-break")))
            .map(|top| oracle.layout_node(&top.node));
        page.stack(Point::new(dims.margin.left, dims.margin.top), blocks);
        Ok(page)
    }
}

fn fill(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, rgb: [u8; 3], ts: Transform) {
    let Some(rect) = Rect::from_xywh(x, y, w, h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, ts, None);
}

const INK: [u8; 3] = [0x55, 0x55, 0x55];
const LINE: [u8; 3] = [0xd0, 0xd0, 0xd0];
const SHADE: [u8; 3] = [0xf4, 0xf4, 0xf4];
const IMAGE: [u8; 3] = [0xe6, 0xe6, 0xe6];

fn paint_item(pixmap: &mut Pixmap, item: &DisplayItem, ts: Transform) {
    match item {
        DisplayItem::TextLine {
            origin,
            width,
            font_size,
            line_height,
            ..
        } => {
            // x-height bar centred in the line box
            let bar = font_size * 0.5;
            let y = origin.y + (line_height - bar) / 2.0;
            fill(pixmap, origin.x, y, *width, bar, INK, ts);
        }
        DisplayItem::ListMarker {
            position,
            font_size,
            marker,
        } => {
            let size = font_size * 0.35;
            let width = match marker {
                ListMarkerDisplay::Bullet => size,
                ListMarkerDisplay::Number(n) => size * n.chars().count() as f32,
            };
            let y = position.y + (font_size * 1.6 - size) / 2.0;
            fill(pixmap, position.x, y, width, size, INK, ts);
        }
        DisplayItem::Rule { rect } => fill(pixmap, rect.x, rect.y, rect.width, rect.height, LINE, ts),
        DisplayItem::ImageBox { rect } => {
            fill(pixmap, rect.x, rect.y, rect.width, rect.height, IMAGE, ts)
        }
        DisplayItem::Frame { rect, style } => match style {
            FrameStyle::Shaded => fill(pixmap, rect.x, rect.y, rect.width, rect.height, SHADE, ts),
            FrameStyle::Bar => fill(pixmap, rect.x, rect.y, rect.width, rect.height, LINE, ts),
            FrameStyle::Outline => {
                fill(pixmap, rect.x, rect.y, rect.width, 1.0, LINE, ts);
                fill(pixmap, rect.x, rect.y + rect.height - 1.0, rect.width, 1.0, LINE, ts);
                fill(pixmap, rect.x, rect.y, 1.0, rect.height, LINE, ts);
                fill(pixmap, rect.x + rect.width - 1.0, rect.y, 1.0, rect.height, LINE, ts);
            }
        },
    }
}

impl PageRasterizer for SkiaRasterizer {
    fn rasterize(
        &mut self,
        page: usize,
        fragment: &PageFragment,
        dims: &PageDimensions,
        scale: f32,
    ) -> Result<RasterPage, ExportError> {
        let width = (dims.width * scale).round().max(1.0) as u32;
        let height = (dims.height * scale).round().max(1.0) as u32;

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| ExportError::Rasterize {
            page,
            reason: format!("cannot allocate a {}x{} bitmap", width, height),
        })?;
        pixmap.fill(Color::WHITE);

        let layout =
            Self::layout(fragment, dims).map_err(|reason| ExportError::Rasterize { page, reason })?;

        let ts = Transform::from_scale(scale, scale);
        for item in layout.visible_items() {
            paint_item(&mut pixmap, item, ts);
        }
        trace!(page, items = layout.items.len(), width, height, "Rasterized page");

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            rgb.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        }

        Ok(RasterPage { width, height, rgb })
    }
}
