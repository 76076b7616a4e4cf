//! Offline page flow
//!
//! Splits an HTML snapshot into page-sized fragments for preview and export,
//! with the same overflow rule as live pagination. Fragments are slices of
//! the source markup, so concatenating them gives back every top-level
//! element in order and unchanged.

use crate::document::html::{self, HtmlNode, TopLevelNode};
use crate::error::HtmlError;
use crate::layout::dimensions::PageDimensions;
use crate::layout::estimate::EstimatingOracle;
use crate::layout::oracle::{BlockRef, LayoutOracle};
use crate::layout::pagination::breaks_before;
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// One page worth of top-level elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageFragment {
    pub html: String,
}

impl PageFragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }
}

/// Check if a node is a page break widget left over from the editing view
fn is_page_break(node: &HtmlNode) -> bool {
    match node {
        HtmlNode::Element(el) => el.has_class("rte-page-break") || el.attr("data-page-break").is_some(),
        HtmlNode::Text(_) => false,
    }
}

/// A parsed snapshot held for measurement.
///
/// Stands in for the off-screen container: it exists only while a flow runs
/// and is released on every exit path.
struct DetachedRender<'a> {
    source: &'a str,
    nodes: Vec<TopLevelNode>,
}

impl<'a> DetachedRender<'a> {
    fn new(source: &'a str) -> Result<Self, HtmlError> {
        let mut nodes = html::parse_fragment(source)?;
        let before = nodes.len();
        nodes.retain(|top| !is_page_break(&top.node));
        if nodes.len() != before {
            trace!(removed = before - nodes.len(), "Dropped page break widgets");
        }
        trace!(blocks = nodes.len(), "Detached render created");
        Ok(Self { source, nodes })
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn markup(&self, index: usize) -> &'a str {
        let span = self.nodes[index].span.clone();
        &self.source[span]
    }

    fn measure(&self, index: usize, oracle: &dyn LayoutOracle) -> f32 {
        oracle.measure(&BlockRef {
            id: None,
            pos: self.nodes[index].span.start,
            html: Cow::Borrowed(self.markup(index)),
        })
    }
}

impl Drop for DetachedRender<'_> {
    fn drop(&mut self) {
        trace!(blocks = self.nodes.len(), "Detached render discarded");
    }
}

/// Flow HTML into pages, measuring with the box estimator at the usable width
pub fn flow(source: &str, dims: &PageDimensions) -> Vec<PageFragment> {
    let oracle = EstimatingOracle::new(dims.usable_width());
    flow_with(source, dims, &oracle)
}

/// Flow HTML into pages with a caller-supplied oracle.
///
/// Always returns at least one fragment. Input that cannot be split comes
/// back as a single fragment holding all of it.
pub fn flow_with(source: &str, dims: &PageDimensions, oracle: &dyn LayoutOracle) -> Vec<PageFragment> {
    let render = match DetachedRender::new(source) {
        Ok(render) => render,
        Err(err) => {
            warn!(error = %err, "Could not split content into blocks, using a single page");
            return vec![PageFragment::new(source)];
        }
    };

    let usable_height = dims.usable_height();
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_height = 0.0;

    for index in 0..render.len() {
        let height = render.measure(index, oracle);

        if breaks_before(current_height, height, usable_height) {
            pages.push(PageFragment::new(std::mem::take(&mut current)));
            current_height = 0.0;
        }

        current.push_str(render.markup(index));
        current_height += height;
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(PageFragment::new(current));
    }

    debug!(blocks = render.len(), pages = pages.len(), "Flowed content into pages");
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::dimensions::{A4, LETTER};

    /// Height taken from a `data-h` attribute
    struct AttrHeights;

    impl LayoutOracle for AttrHeights {
        fn measure(&self, block: &BlockRef<'_>) -> f32 {
            html::parse_element(&block.html)
                .ok()
                .flatten()
                .and_then(|el| el.attr("data-h").and_then(|h| h.parse().ok()))
                .unwrap_or(0.0)
        }
    }

    fn blocks(heights: &[u32]) -> String {
        heights
            .iter()
            .enumerate()
            .map(|(i, h)| format!(r#"<p data-h="{}">block {}</p>"#, h, i))
            .collect()
    }

    #[test]
    fn test_three_blocks_of_400() {
        let source = blocks(&[400, 400, 400]);
        let pages = flow_with(&source, &A4, &AttrHeights);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].html.contains("block 1"));
        assert!(pages[1].html.starts_with(r#"<p data-h="400">block 2"#));
    }

    #[test]
    fn test_round_trip() {
        let source = blocks(&[100, 700, 300, 931, 5, 2000, 0, 60]);
        let pages = flow_with(&source, &A4, &AttrHeights);

        let joined: String = pages.iter().map(|p| p.html.as_str()).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_oversized_block_stands_alone() {
        let source = blocks(&[300, 2000, 300]);
        let pages = flow_with(&source, &A4, &AttrHeights);

        assert_eq!(pages.len(), 3);
        assert!(pages[0].html.contains("block 0"));
        assert!(pages[1].html.contains("block 1"));
        assert!(!pages[1].html.contains("block 2"));
    }

    #[test]
    fn test_empty_input_gives_one_blank_page() {
        for source in ["", "   \n  "] {
            let pages = flow(source, &A4);
            assert_eq!(pages.len(), 1);
            assert!(pages[0].is_empty());
        }
    }

    #[test]
    fn test_page_break_widgets_removed() {
        let source = concat!(
            "<p>one</p>",
            r#"<div class="rte-page-break" contenteditable="false" data-page-break="true"><div class="rte-page-break__gap">1</div></div>"#,
            "<p>two</p>"
        );
        let pages = flow(source, &LETTER);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].html, "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_estimated_flow_splits_long_documents() {
        let source = "<p>paragraph of text</p>".repeat(60);
        let pages = flow(&source, &A4);

        // 34.4px per paragraph, 27 fit in 931px
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].html.matches("<p>").count(), 27);
        let joined: String = pages.iter().map(|p| p.html.as_str()).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_images_inside_paragraphs_take_space() {
        let source = r#"<p><img src="a.png" width="300" height="500"></p>"#.repeat(3);
        let pages = flow(&source, &A4);

        assert_eq!(pages.len(), 3);
        let joined: String = pages.iter().map(|p| p.html.as_str()).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_unparseable_input_is_one_fragment() {
        for source in ["<p>a</p><!-- open", "<p>a</p><p class=\"x"] {
            let pages = flow(source, &A4);
            assert_eq!(pages.len(), 1);
            assert_eq!(pages[0].html, source);
        }
    }

    #[test]
    fn test_flow_is_deterministic() {
        let source = "<h1>Title</h1>".to_string() + &"<p>text</p>".repeat(40);
        assert_eq!(flow(&source, &A4), flow(&source, &A4));
    }
}
