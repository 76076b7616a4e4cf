//! Render output: display lists, decorations and read-only preview

mod decoration;
mod display;
mod preview;

pub use decoration::{decorated_html, page_break_html, EMPTY_CLASS};
pub use display::{BlockLayout, DisplayItem, DisplayPage, FrameStyle, ListMarkerDisplay};
pub use preview::{preview_html, render_preview, PreviewPage};
