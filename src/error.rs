//! Error types for the editor core

use thiserror::Error;

/// Errors surfaced by the editor session and the structured-document editor
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor not initialized")]
    NotInitialized,

    #[error("Invalid step: {0}")]
    Step(#[from] StepError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid HTML: {0}")]
    Html(#[from] HtmlError),
}

/// A step could not be applied to the document it was built against
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("position {pos} is outside the document (size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("position {pos} does not point into block content")]
    NotInTextblock { pos: usize },

    #[error("range {from}..{to} spans more than one block")]
    CrossesBlocks { from: usize, to: usize },

    #[error("block range {from}..{to} is out of bounds (block count {len})")]
    BlockRangeOutOfBounds { from: usize, to: usize, len: usize },
}

/// Errors from the PDF export and print pipelines
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("rasterizing page {page} failed: {reason}")]
    Rasterize { page: usize, reason: String },

    #[error("page {page} raster is {got} bytes, expected {expected}")]
    RasterSize {
        page: usize,
        expected: usize,
        got: usize,
    },

    #[error("failed to decode page image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("{0} is not available on this target")]
    Unsupported(&'static str),
}

/// HTML could not be tokenized into blocks
#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("malformed markup at byte {position}: {source}")]
    Malformed {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
}

/// A page format name was not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown page format {0:?} (expected \"a4\" or \"letter\")")]
pub struct ParseFormatError(pub String);
