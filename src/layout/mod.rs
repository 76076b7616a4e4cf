//! Page geometry, block measurement and pagination

pub mod dimensions;
pub mod estimate;
pub mod flow;
pub mod font;
pub mod oracle;
pub mod pagination;

pub use dimensions::{
    Margins, PageDimensions, PageFormat, A4, INITIAL_PAGINATION_DELAY_MS, LETTER, PAGE_FORMATS,
    PAGE_GAP, PAGINATION_DEBOUNCE_MS,
};
pub use estimate::{break_lines, BlockStyle, EstimatingOracle, TextLine};
pub use flow::{flow, flow_with, PageFragment};
pub use font::FontMetrics;
pub use oracle::{BlockRef, BoxMetrics, LayoutOracle, RenderSurface};
pub use pagination::{
    breaks_before, canvas_min_height, compute_page_breaks, PageBreakMarker, PaginationHost,
    PaginationState, Paginator,
};
