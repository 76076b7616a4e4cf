//! Print bridge
//!
//! Printing is delegated to the host. What this crate owns is the print
//! stylesheet that makes the browser paginate like the editor does.

use crate::error::ExportError;
use crate::layout::PageDimensions;

/// Opens the host's native print flow
pub trait PrintBridge {
    fn print(&mut self) -> Result<(), ExportError>;
}

/// `@page` rules matching the page format: exact paper size, no UA margins
/// (the page padding already provides them) and hidden break widgets.
pub fn print_stylesheet(dims: &PageDimensions) -> String {
    let (width, height) = dims.size_mm();
    format!(
        concat!(
            "@page {{ size: {width:.1}mm {height:.1}mm; margin: 0; }}\n",
            "@media print {{\n",
            "  .rte-page-break {{ display: none !important; }}\n",
            "  .rte-editor__page {{ box-shadow: none; margin: 0; ",
            "padding: {top}px {right}px {bottom}px {left}px; }}\n",
            "}}\n"
        ),
        width = width,
        height = height,
        top = dims.margin.top,
        right = dims.margin.right,
        bottom = dims.margin.bottom,
        left = dims.margin.left,
    )
}

/// Bridge for hosts without a print dialog
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintBridge for NoPrint {
    fn print(&mut self) -> Result<(), ExportError> {
        Err(ExportError::Unsupported("printing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{A4, LETTER};

    #[test]
    fn test_page_size_in_mm() {
        assert!(print_stylesheet(&A4).starts_with("@page { size: 210.1mm 297.1mm; margin: 0; }"));
        assert!(print_stylesheet(&LETTER).starts_with("@page { size: 215.9mm 279.4mm; margin: 0; }"));
    }

    #[test]
    fn test_widgets_hidden_in_print() {
        assert!(print_stylesheet(&A4).contains(".rte-page-break { display: none !important; }"));
    }

    #[test]
    fn test_no_print() {
        assert!(matches!(NoPrint.print(), Err(ExportError::Unsupported(_))));
    }
}
