//! PDF export and printing

mod pdf;
mod print;
mod raster;

pub use pdf::{export_pdf, PdfAssembler};
pub use print::{print_stylesheet, NoPrint, PrintBridge};
pub use raster::{PageRasterizer, RasterPage, SkiaRasterizer, EXPORT_SCALE};
