//! Deterministic box estimator
//!
//! Approximates how the editor stylesheet lays out a block without a
//! rendering engine: text is broken into lines at UAX #14 opportunities using
//! per-grapheme advance widths, and every block kind gets the font size,
//! line height and spacing the stylesheet gives it. The result is a
//! [`BlockLayout`], whose outer height is what pagination consumes and whose
//! display items the rasterizer paints.

use crate::document::html::{self, HtmlElement, HtmlNode};
use crate::layout::font::FontMetrics;
use crate::layout::oracle::{BlockRef, LayoutOracle};
use crate::render::{BlockLayout, DisplayItem, FrameStyle, ListMarkerDisplay};
use crate::{Point, Rect};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use tracing::trace;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Body font size
pub const BASE_FONT_SIZE: f32 = 14.0;

/// Body line height, relative to the font size
pub const BASE_LINE_HEIGHT: f32 = 1.6;

/// Indentation of list items
pub const LIST_INDENT: f32 = 24.0;

const QUOTE_BAR: f32 = 3.0;
const QUOTE_PADDING: f32 = 16.0;
const CODE_PADDING: f32 = 12.0;
const CELL_PADDING: f32 = 8.0;
const RULE_THICKNESS: f32 = 1.0;

/// Cached measurements before the cache is reset
const MAX_CACHED: usize = 4096;

/// Typography and spacing of one block kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    /// Line height relative to the font size
    pub line_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub monospace: bool,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            font_size: BASE_FONT_SIZE,
            line_height: BASE_LINE_HEIGHT,
            margin_top: 0.0,
            margin_bottom: 0.0,
            monospace: false,
        }
    }
}

impl BlockStyle {
    /// Style the editor stylesheet gives a tag
    pub fn for_tag(tag: &str) -> Self {
        let heading = |font_size, margin_top, margin_bottom| Self {
            font_size,
            line_height: 1.3,
            margin_top,
            margin_bottom,
            monospace: false,
        };

        match tag {
            "h1" => heading(28.0, 24.0, 12.0),
            "h2" => heading(22.0, 20.0, 10.0),
            "h3" => heading(18.0, 16.0, 8.0),
            "h4" => heading(16.0, 14.0, 8.0),
            "h5" => heading(14.0, 12.0, 6.0),
            "h6" => heading(13.0, 12.0, 6.0),
            "p" | "ul" | "ol" => Self {
                margin_bottom: 12.0,
                ..Self::default()
            },
            "li" => Self {
                margin_bottom: 4.0,
                ..Self::default()
            },
            "blockquote" | "table" => Self {
                margin_top: 12.0,
                margin_bottom: 12.0,
                ..Self::default()
            },
            "pre" => Self {
                font_size: 13.0,
                line_height: 1.5,
                margin_top: 12.0,
                margin_bottom: 12.0,
                monospace: true,
            },
            "hr" => Self {
                margin_top: 16.0,
                margin_bottom: 16.0,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Font metrics for this style
    pub fn metrics(&self) -> FontMetrics {
        if self.monospace {
            FontMetrics::monospace(self.font_size, self.line_height)
        } else {
            FontMetrics::sans(self.font_size, self.line_height)
        }
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "pre"
            | "hr"
            | "table"
            | "div"
            | "section"
            | "article"
            | "figure"
            | "figcaption"
            | "header"
            | "footer"
    )
}

/// Blocks that render one empty line when they have no text
fn is_text_block(tag: &str) -> bool {
    matches!(tag, "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "td" | "th")
}

/// A laid out line of text and its width
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
}

/// Break text into lines no wider than `max_width`.
///
/// Lines end at mandatory breaks (`\n`) and wrap at the last allowed break
/// opportunity that fits. A word wider than the line is split between
/// grapheme clusters. Trailing whitespace hangs and is not counted.
pub fn break_lines(text: &str, metrics: &FontMetrics, max_width: f32) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;
    let mut start = 0;

    for (end, opportunity) in linebreaks(text) {
        let segment = &text[start..end];
        start = end;

        let body = segment.trim_end_matches(char::is_whitespace);
        let body_width = metrics.text_width(body);

        if !line.is_empty() && line_width + body_width > max_width {
            finish_line(&mut lines, &mut line, metrics);
            line_width = 0.0;
        }

        if line.is_empty() && body_width > max_width {
            // Emergency break inside the word
            for grapheme in body.graphemes(true) {
                let width = metrics.grapheme_width(grapheme);
                if !line.is_empty() && line_width + width > max_width {
                    finish_line(&mut lines, &mut line, metrics);
                    line_width = 0.0;
                }
                line.push_str(grapheme);
                line_width += width;
            }
            let tail = &segment[body.len()..];
            line.push_str(tail);
            line_width += metrics.text_width(tail);
        } else {
            line.push_str(segment);
            line_width += metrics.text_width(segment);
        }

        if matches!(opportunity, BreakOpportunity::Mandatory) && end < text.len() {
            finish_line(&mut lines, &mut line, metrics);
            line_width = 0.0;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        finish_line(&mut lines, &mut line, metrics);
    }

    lines
}

fn finish_line(lines: &mut Vec<TextLine>, line: &mut String, metrics: &FontMetrics) {
    let text = line.trim_end_matches(char::is_whitespace).to_string();
    let width = metrics.text_width(&text);
    lines.push(TextLine { text, width });
    line.clear();
}

/// Gather the inline text of nodes the way the browser would render it.
///
/// Outside preformatted content whitespace runs collapse to one space; `<br>`
/// becomes a newline either way.
fn collect_inline<'a, I>(nodes: I, preserve: bool, out: &mut String)
where
    I: IntoIterator<Item = &'a HtmlNode>,
{
    for node in nodes {
        match node {
            HtmlNode::Text(text) if preserve => out.push_str(text),
            HtmlNode::Text(text) => {
                for c in text.chars() {
                    if c.is_whitespace() && c != '\u{a0}' {
                        if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                            out.push(' ');
                        }
                    } else {
                        out.push(c);
                    }
                }
            }
            HtmlNode::Element(el) if el.tag == "br" => {
                let trimmed = out.trim_end_matches(' ').len();
                out.truncate(trimmed);
                out.push('\n');
            }
            HtmlNode::Element(el) => collect_inline(&el.children, preserve, out),
        }
    }
}

/// Parse a CSS-ish pixel length such as `300` or `300px`
fn parse_length(value: &str) -> Option<f32> {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Look up a length in an element's `style` attribute
fn style_length(el: &HtmlElement, property: &str) -> Option<f32> {
    el.attr("style")?.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(property) {
            parse_length(value)
        } else {
            None
        }
    })
}

fn translate_all(items: &mut [DisplayItem], dx: f32, dy: f32) {
    for item in items {
        item.translate(dx, dy);
    }
}

/// Headless layout oracle backed by the box estimator
#[derive(Debug)]
pub struct EstimatingOracle {
    /// Width blocks are laid out at
    width: f32,
    /// Outer heights keyed by block markup
    cache: RefCell<FxHashMap<String, f32>>,
}

impl EstimatingOracle {
    /// Create an estimator laying blocks out at `width`
    pub fn new(width: f32) -> Self {
        Self {
            width,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Lay out the first node of an HTML snippet.
    ///
    /// Markup that cannot be parsed lays out as nothing.
    pub fn layout_html(&self, source: &str) -> BlockLayout {
        match html::parse_fragment(source) {
            Ok(nodes) => nodes
                .first()
                .map(|top| self.layout_node(&top.node))
                .unwrap_or_default(),
            Err(err) => {
                trace!(error = %err, "Block markup did not parse, measuring as empty");
                BlockLayout::default()
            }
        }
    }

    /// Lay out a top-level node at the estimator width
    pub fn layout_node(&self, node: &HtmlNode) -> BlockLayout {
        match node {
            HtmlNode::Element(el) => self.layout_element(el, self.width, None),
            HtmlNode::Text(_) => {
                // Anonymous text gets a line box but no block margins
                let style = BlockStyle::default();
                let mut text = String::new();
                collect_inline(std::slice::from_ref(node), false, &mut text);
                let (height, items) = self.layout_text(text.trim(), &style, self.width);
                BlockLayout {
                    margin_top: 0.0,
                    margin_bottom: 0.0,
                    height,
                    items,
                }
            }
        }
    }

    fn layout_element(&self, el: &HtmlElement, width: f32, parent: Option<&str>) -> BlockLayout {
        let mut style = BlockStyle::for_tag(&el.tag);
        if el.tag == "p" && matches!(parent, Some("li" | "td" | "th")) {
            style.margin_top = 0.0;
            style.margin_bottom = 0.0;
        }

        let (height, items) = match el.tag.as_str() {
            "hr" => (
                RULE_THICKNESS,
                vec![DisplayItem::Rule {
                    rect: Rect::new(0.0, 0.0, width, RULE_THICKNESS),
                }],
            ),
            "img" => return self.layout_image(el, width),
            "ul" | "ol" => self.layout_list(el, &style, width),
            "table" => self.layout_table(el, width),
            "blockquote" => {
                let inset = QUOTE_BAR + QUOTE_PADDING;
                let (height, mut items) =
                    self.layout_children(&el.children, &style, width - inset, &el.tag);
                translate_all(&mut items, inset, 0.0);
                items.insert(
                    0,
                    DisplayItem::Frame {
                        rect: Rect::new(0.0, 0.0, QUOTE_BAR, height),
                        style: FrameStyle::Bar,
                    },
                );
                (height, items)
            }
            "pre" => {
                let mut text = String::new();
                collect_inline(&el.children, true, &mut text);
                let (inner, mut items) = self.layout_text(
                    text.trim_end_matches('\n'),
                    &style,
                    width - 2.0 * CODE_PADDING,
                );
                translate_all(&mut items, CODE_PADDING, CODE_PADDING);
                let height = inner + 2.0 * CODE_PADDING;
                items.insert(
                    0,
                    DisplayItem::Frame {
                        rect: Rect::new(0.0, 0.0, width, height),
                        style: FrameStyle::Shaded,
                    },
                );
                (height, items)
            }
            _ => self.layout_children(&el.children, &style, width, &el.tag),
        };

        BlockLayout {
            margin_top: style.margin_top,
            margin_bottom: style.margin_bottom,
            height,
            items,
        }
    }

    /// Stack inline runs and nested blocks vertically
    fn layout_children(
        &self,
        children: &[HtmlNode],
        style: &BlockStyle,
        width: f32,
        tag: &str,
    ) -> (f32, Vec<DisplayItem>) {
        let mut y = 0.0;
        let mut items = Vec::new();
        let mut inline: Vec<&HtmlNode> = Vec::new();

        for child in children {
            match child {
                HtmlNode::Element(el) if el.tag == "img" => {
                    // Images are atomic boxes, never inline text
                    self.flush_inline(&mut inline, style, width, &mut y, &mut items);
                    let image = self.layout_image(el, width);
                    let mut boxed = image.items;
                    translate_all(&mut boxed, 0.0, y);
                    items.extend(boxed);
                    y += image.height;
                }
                HtmlNode::Element(el) if is_block_tag(&el.tag) => {
                    self.flush_inline(&mut inline, style, width, &mut y, &mut items);
                    let block = self.layout_element(el, width, Some(tag));
                    y += block.margin_top;
                    let mut nested = block.items;
                    translate_all(&mut nested, 0.0, y);
                    items.extend(nested);
                    y += block.height + block.margin_bottom;
                }
                node => inline.push(node),
            }
        }
        self.flush_inline(&mut inline, style, width, &mut y, &mut items);

        if y == 0.0 && is_text_block(tag) {
            // Empty text blocks keep one line box
            y = style.metrics().line_height;
        }

        (y, items)
    }

    fn flush_inline(
        &self,
        inline: &mut Vec<&HtmlNode>,
        style: &BlockStyle,
        width: f32,
        y: &mut f32,
        items: &mut Vec<DisplayItem>,
    ) {
        let mut text = String::new();
        collect_inline(inline.drain(..), false, &mut text);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let (height, mut lines) = self.layout_text(text, style, width);
        translate_all(&mut lines, 0.0, *y);
        items.extend(lines);
        *y += height;
    }

    fn layout_text(&self, text: &str, style: &BlockStyle, width: f32) -> (f32, Vec<DisplayItem>) {
        let metrics = style.metrics();
        let lines = break_lines(text, &metrics, width.max(1.0));
        let height = lines.len() as f32 * metrics.line_height;

        let items = lines
            .into_iter()
            .enumerate()
            .filter(|(_, line)| !line.text.is_empty())
            .map(|(i, line)| DisplayItem::TextLine {
                origin: Point::new(0.0, i as f32 * metrics.line_height),
                width: line.width,
                font_size: metrics.size,
                line_height: metrics.line_height,
                text: line.text,
            })
            .collect();

        (height, items)
    }

    fn layout_list(&self, el: &HtmlElement, style: &BlockStyle, width: f32) -> (f32, Vec<DisplayItem>) {
        let ordered = el.tag == "ol";
        let start = el
            .attr("start")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);

        let mut y = 0.0;
        let mut items = Vec::new();

        for (index, li) in el.child_elements().enumerate() {
            let item = self.layout_element(li, width - LIST_INDENT, Some(el.tag.as_str()));
            y += item.margin_top;

            let marker = if ordered {
                ListMarkerDisplay::Number(format!("{}.", start + index as i64))
            } else {
                ListMarkerDisplay::Bullet
            };
            items.push(DisplayItem::ListMarker {
                position: Point::new(LIST_INDENT / 4.0, y),
                font_size: style.font_size,
                marker,
            });

            let mut nested = item.items;
            translate_all(&mut nested, LIST_INDENT, y);
            items.extend(nested);
            y += item.height + item.margin_bottom;
        }

        (y, items)
    }

    fn layout_table(&self, el: &HtmlElement, width: f32) -> (f32, Vec<DisplayItem>) {
        let mut rows = Vec::new();
        collect_rows(el, &mut rows);

        let columns = rows
            .iter()
            .map(|row| row.child_elements().filter(|c| is_cell(c)).count())
            .max()
            .unwrap_or(0)
            .max(1);
        let column_width = width / columns as f32;
        let style = BlockStyle::default();

        let mut y = 0.0;
        let mut items = Vec::new();

        for row in rows {
            let mut row_height: f32 = 0.0;
            let mut cells = Vec::new();

            for (col, cell) in row.child_elements().filter(|c| is_cell(c)).enumerate() {
                let (height, mut content) = self.layout_children(
                    &cell.children,
                    &style,
                    column_width - 2.0 * CELL_PADDING,
                    &cell.tag,
                );
                let x = col as f32 * column_width;
                translate_all(&mut content, x + CELL_PADDING, y + CELL_PADDING);
                row_height = row_height.max(height + 2.0 * CELL_PADDING);
                cells.push((x, content));
            }

            for (x, content) in cells {
                items.push(DisplayItem::Frame {
                    rect: Rect::new(x, y, column_width, row_height),
                    style: FrameStyle::Outline,
                });
                items.extend(content);
            }
            y += row_height;
        }

        if y > 0.0 {
            // Collapsed outer border
            y += 1.0;
        }
        (y, items)
    }

    /// Images measure from their declared size, scaled down to fit.
    ///
    /// Without a height the image has not loaded yet and takes no space.
    fn layout_image(&self, el: &HtmlElement, available: f32) -> BlockLayout {
        let declared_width = el
            .attr("width")
            .and_then(parse_length)
            .or_else(|| style_length(el, "width"));
        let declared_height = el
            .attr("height")
            .and_then(parse_length)
            .or_else(|| style_length(el, "height"));

        let Some(mut height) = declared_height else {
            return BlockLayout::default();
        };
        let mut width = declared_width.unwrap_or(available);
        if width > available && width > 0.0 {
            height *= available / width;
            width = available;
        }

        BlockLayout {
            margin_top: 0.0,
            margin_bottom: 0.0,
            height,
            items: vec![DisplayItem::ImageBox {
                rect: Rect::new(0.0, 0.0, width, height),
            }],
        }
    }
}

fn is_cell(el: &HtmlElement) -> bool {
    matches!(el.tag.as_str(), "td" | "th")
}

fn collect_rows<'a>(el: &'a HtmlElement, rows: &mut Vec<&'a HtmlElement>) {
    for child in el.child_elements() {
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

impl LayoutOracle for EstimatingOracle {
    fn measure(&self, block: &BlockRef<'_>) -> f32 {
        if let Some(height) = self.cache.borrow().get(block.html.as_ref()) {
            return *height;
        }

        let height = self.layout_html(&block.html).outer_height();

        let mut cache = self.cache.borrow_mut();
        if cache.len() >= MAX_CACHED {
            cache.clear();
        }
        cache.insert(block.html.clone().into_owned(), height);
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn oracle() -> EstimatingOracle {
        EstimatingOracle::new(602.0)
    }

    fn measure(html: &str) -> f32 {
        oracle().measure(&BlockRef {
            id: None,
            pos: 0,
            html: Cow::Borrowed(html),
        })
    }

    #[test]
    fn test_break_lines_wraps_at_spaces() {
        let metrics = FontMetrics::monospace(10.0, 1.0);
        // 6px per char, 30px = 5 chars per line
        let lines = break_lines("aaa bbb ccc", &metrics, 30.0);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["aaa", "bbb", "ccc"]);
        assert!(lines.iter().all(|l| l.width <= 30.0));
    }

    #[test]
    fn test_break_lines_mandatory() {
        let metrics = FontMetrics::monospace(10.0, 1.0);
        let lines = break_lines("a\n\nb\n", &metrics, 100.0);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }

    #[test]
    fn test_break_lines_emergency() {
        let metrics = FontMetrics::monospace(10.0, 1.0);
        let lines = break_lines("abcdefghij", &metrics, 24.0);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_empty_text_is_one_line() {
        let metrics = FontMetrics::default();
        assert_eq!(break_lines("", &metrics, 100.0).len(), 1);
    }

    #[test]
    fn test_paragraph_height() {
        // one 22.4px line plus 12px bottom margin
        assert!(approx(measure("<p>Hello</p>"), 34.4));
        assert!(approx(measure("<p></p>"), 34.4));
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        let layout = oracle().layout_html(&format!("<p>{}</p>", text));
        let lines = layout
            .items
            .iter()
            .filter(|i| matches!(i, DisplayItem::TextLine { .. }))
            .count();
        assert!(lines > 1);
        assert!(approx(layout.height, lines as f32 * 22.4));
        assert!(layout.items.iter().all(|i| i.bounds().width <= 602.0));
    }

    #[test]
    fn test_heading_and_rule() {
        assert!(approx(measure("<h1>Title</h1>"), 36.4 + 24.0 + 12.0));
        assert!(approx(measure("<hr>"), 33.0));
    }

    #[test]
    fn test_line_breaks() {
        assert!(approx(measure("<p>a<br>b</p>"), 2.0 * 22.4 + 12.0));
    }

    #[test]
    fn test_images() {
        assert!(approx(measure(r#"<img src="a.png" width="1204" height="400">"#), 200.0));
        assert!(approx(measure(r#"<img src="a.png" height="120">"#), 120.0));
        assert_eq!(measure(r#"<img src="a.png">"#), 0.0);
        assert_eq!(measure(r#"<img src="a.png" width="300">"#), 0.0);
    }

    #[test]
    fn test_images_inside_blocks() {
        let img = r#"<img src="a.png" width="300" height="500">"#;
        // paragraph bottom margin only
        assert!(approx(measure(&format!("<p>{}</p>", img)), 512.0));
        assert!(approx(measure(&format!("<div>{}</div>", img)), 500.0));
        assert!(approx(measure(&format!("<figure>{}</figure>", img)), 500.0));

        let layout = oracle().layout_html(&format!("<p>caption {}</p>", img));
        assert!(approx(layout.height, 22.4 + 500.0));
        assert!(layout.items.iter().any(|i| matches!(
            i,
            DisplayItem::ImageBox { rect } if approx(rect.y, 22.4) && approx(rect.height, 500.0)
        )));
    }

    #[test]
    fn test_unloaded_image_in_paragraph_keeps_line_box() {
        assert!(approx(measure(r#"<p><img src="a.png"></p>"#), 34.4));
    }

    #[test]
    fn test_cache_keyed_by_markup() {
        let oracle = oracle();
        let short = BlockRef {
            id: None,
            pos: 0,
            html: Cow::Borrowed("<p>a</p>"),
        };
        let tall = BlockRef {
            id: None,
            pos: 0,
            html: Cow::Borrowed("<p>a<br>b<br>c</p>"),
        };
        let first = oracle.measure(&short);
        let second = oracle.measure(&tall);
        assert!(second > first);
        assert!(oracle.cache.borrow().contains_key("<p>a<br>b<br>c</p>"));
        assert_eq!(oracle.measure(&short), first);
    }

    #[test]
    fn test_list() {
        let h = measure("<ul><li><p>one</p></li><li><p>two</p></li></ul>");
        assert!(approx(h, 2.0 * (22.4 + 4.0) + 12.0));

        let layout = oracle().layout_html("<ol start=\"3\"><li>x</li></ol>");
        assert!(layout.items.iter().any(|i| matches!(
            i,
            DisplayItem::ListMarker { marker: ListMarkerDisplay::Number(n), .. } if n == "3."
        )));
    }

    #[test]
    fn test_code_block_keeps_newlines() {
        let h = measure("<pre><code>a\nb\nc\n</code></pre>");
        assert!(approx(h, 3.0 * 19.5 + 24.0 + 24.0));
    }

    #[test]
    fn test_table_rows() {
        let h = measure("<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td></td></tr></tbody></table>");
        // two rows of one line plus cell padding, outer border, margins
        assert!(approx(h, 2.0 * (22.4 + 16.0) + 1.0 + 24.0));
    }

    #[test]
    fn test_blockquote_bar() {
        let layout = oracle().layout_html("<blockquote><p>quoted</p></blockquote>");
        assert!(matches!(
            layout.items[0],
            DisplayItem::Frame { style: FrameStyle::Bar, .. }
        ));
        assert!(approx(layout.outer_height(), 22.4 + 12.0 + 24.0));
    }

    #[test]
    fn test_top_level_text() {
        assert!(approx(measure("loose text"), 22.4));
    }

    #[test]
    fn test_measure_is_cached() {
        let oracle = oracle();
        let block = BlockRef {
            id: None,
            pos: 0,
            html: Cow::Borrowed("<p>cached</p>"),
        };
        let first = oracle.measure(&block);
        assert_eq!(oracle.cache.borrow().len(), 1);
        assert_eq!(oracle.measure(&block), first);
        assert_eq!(oracle.cache.borrow().len(), 1);
    }

    #[test]
    fn test_collapse_whitespace() {
        let el = html::parse_element("<p>  a \n\t b <em> c </em></p>").unwrap().unwrap();
        let mut text = String::new();
        collect_inline(&el.children, false, &mut text);
        assert_eq!(text.trim(), "a b c");
    }
}
