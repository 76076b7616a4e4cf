//! PDF assembly
//!
//! Every page is a single full-bleed RGB image, so the file needs no fonts:
//! catalog, page tree, and per page an image XObject, a content stream that
//! paints it, and the page object.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj  Catalog
//! 2 0 obj  Pages
//! 3 0 obj  Image (page 1)
//! 4 0 obj  Content stream (page 1)
//! 5 0 obj  Page 1
//! ...
//! xref
//! trailer
//! %%EOF
//! ```

use crate::error::ExportError;
use crate::export::raster::{PageRasterizer, RasterPage};
use crate::layout::{flow, PageDimensions};
use miniz_oxide::deflate::compress_to_vec_zlib;
use std::io::Write as IoWrite;
use tracing::{debug, info};

const COMPRESSION_LEVEL: u8 = 6;

/// Collects page images and serializes them into a PDF file
pub struct PdfAssembler {
    /// Object bodies, index = object number. Slot 0 is unused.
    objects: Vec<Vec<u8>>,
    page_ids: Vec<usize>,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAssembler {
    pub fn new() -> Self {
        // 0 = placeholder, 1 = Catalog, 2 = Pages
        Self {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            page_ids: Vec::new(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Add one page showing `raster` stretched over a `width_pt` x `height_pt` MediaBox
    pub fn add_page(&mut self, raster: &RasterPage, width_pt: f32, height_pt: f32) {
        let compressed = compress_to_vec_zlib(&raster.rgb, COMPRESSION_LEVEL);
        let mut image: Vec<u8> = Vec::new();
        let _ = write!(
            image,
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
            raster.width,
            raster.height,
            compressed.len()
        );
        image.extend_from_slice(&compressed);
        image.extend_from_slice(b"\nendstream");
        let image_id = self.push(image);

        let content = format!("q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im0 Do\nQ\n", width_pt, height_pt);
        let compressed = compress_to_vec_zlib(content.as_bytes(), COMPRESSION_LEVEL);
        let mut stream: Vec<u8> = Vec::new();
        let _ = write!(
            stream,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        stream.extend_from_slice(&compressed);
        stream.extend_from_slice(b"\nendstream");
        let content_id = self.push(stream);

        let page = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << /XObject << /Im0 {} 0 R >> >> >>",
            width_pt, height_pt, content_id, image_id
        );
        let page_id = self.push(page.into_bytes());
        self.page_ids.push(page_id);
    }

    /// Serialize all objects into the final PDF byte stream
    pub fn finish(mut self) -> Vec<u8> {
        self.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids: Vec<String> = self.page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        self.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.page_ids.len()
        )
        .into_bytes();

        let mut output: Vec<u8> = Vec::new();
        let mut offsets = vec![0; self.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in self.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", self.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len(),
            xref_offset
        );

        output
    }
}

/// Flow `html` into pages, rasterize each one and assemble the PDF.
///
/// The first failing page aborts the whole export.
pub fn export_pdf(
    html: &str,
    dims: &PageDimensions,
    rasterizer: &mut dyn PageRasterizer,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let fragments = flow(html, dims);
    let (width_pt, height_pt) = dims.size_pt();
    let (width_mm, height_mm) = dims.size_mm();
    info!(
        pages = fragments.len(),
        width_mm = width_mm as f64,
        height_mm = height_mm as f64,
        "Exporting PDF"
    );

    let mut pdf = PdfAssembler::new();
    for (index, fragment) in fragments.iter().enumerate() {
        let number = index + 1;
        let raster = rasterizer.rasterize(number, fragment, dims, scale)?;
        raster.validate(number)?;
        pdf.add_page(&raster, width_pt, height_pt);
        debug!(page = number, of = fragments.len(), "Page added to PDF");
    }

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::raster::{SkiaRasterizer, EXPORT_SCALE};
    use crate::layout::{PageFragment, A4, LETTER};

    fn count(bytes: &[u8], needle: &[u8]) -> usize {
        bytes.windows(needle.len()).filter(|w| *w == needle).count()
    }

    /// Solid-colour pages, failing from page `fail_at` on
    struct Solid {
        fail_at: Option<usize>,
        calls: usize,
    }

    impl PageRasterizer for Solid {
        fn rasterize(
            &mut self,
            page: usize,
            _fragment: &PageFragment,
            _dims: &PageDimensions,
            _scale: f32,
        ) -> Result<RasterPage, ExportError> {
            self.calls += 1;
            if self.fail_at.is_some_and(|n| page >= n) {
                return Err(ExportError::Rasterize {
                    page,
                    reason: "surface lost".to_string(),
                });
            }
            Ok(RasterPage {
                width: 4,
                height: 4,
                rgb: vec![200; 48],
            })
        }
    }

    #[test]
    fn test_empty_assembler_is_valid_pdf() {
        let bytes = PdfAssembler::new().finish();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert_eq!(count(&bytes, b"/Count 0"), 1);
    }

    #[test]
    fn test_one_page_per_fragment() {
        let html = "<p>paragraph of text</p>".repeat(60);
        let mut rasterizer = Solid {
            fail_at: None,
            calls: 0,
        };
        let bytes = export_pdf(&html, &A4, &mut rasterizer, EXPORT_SCALE).unwrap();

        assert_eq!(rasterizer.calls, 3);
        assert_eq!(count(&bytes, b"/Type /Page "), 3);
        assert_eq!(count(&bytes, b"/Count 3"), 1);
        assert_eq!(count(&bytes, b"/Subtype /Image"), 3);
    }

    #[test]
    fn test_media_box_in_points() {
        let mut rasterizer = Solid {
            fail_at: None,
            calls: 0,
        };
        let bytes = export_pdf("<p>x</p>", &A4, &mut rasterizer, 1.0).unwrap();
        assert_eq!(count(&bytes, b"/MediaBox [0 0 595.50 842.25]"), 1);

        let bytes = export_pdf("<p>x</p>", &LETTER, &mut rasterizer, 1.0).unwrap();
        assert_eq!(count(&bytes, b"/MediaBox [0 0 612.00 792.00]"), 1);
    }

    #[test]
    fn test_failing_page_aborts_export() {
        let html = "<p>paragraph of text</p>".repeat(60);
        let mut rasterizer = Solid {
            fail_at: Some(2),
            calls: 0,
        };
        let err = export_pdf(&html, &A4, &mut rasterizer, EXPORT_SCALE).unwrap_err();

        assert!(matches!(err, ExportError::Rasterize { page: 2, .. }));
        assert_eq!(rasterizer.calls, 2);
    }

    #[test]
    fn test_skia_export() {
        let mut rasterizer = SkiaRasterizer::new();
        let bytes = export_pdf("<h1>Title</h1><p>Body</p>", &LETTER, &mut rasterizer, 1.0).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert_eq!(count(&bytes, b"/Width 816 /Height 1056"), 1);
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut pdf = PdfAssembler::new();
        pdf.add_page(
            &RasterPage {
                width: 1,
                height: 1,
                rgb: vec![0, 0, 0],
            },
            10.0,
            10.0,
        );
        let bytes = pdf.finish();

        let xref = bytes.windows(5).position(|w| w == b"xref\n").unwrap();
        let table = std::str::from_utf8(&bytes[xref..]).unwrap();
        let offsets: Vec<usize> = table
            .lines()
            .skip(3)
            .take(5)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in offsets.iter().enumerate() {
            assert!(bytes[*offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }
}
