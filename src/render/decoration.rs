//! Page break widgets and the decorated view of a document

use crate::document::{BlockKind, Document};
use crate::layout::{PageDimensions, PaginationState, PAGE_GAP};
use crate::util::class_names;

/// Class applied to the empty first paragraph so the placeholder shows
pub const EMPTY_CLASS: &str = "is-editor-empty";

/// Markup of the widget drawn between two pages.
///
/// Bottom margin of the ending page, its shadowed edge, the gap carrying the
/// page number, the top edge and top margin of the next page. Negative side
/// margins let it span the full paper width past the content padding.
pub fn page_break_html(page_number: usize, dims: &PageDimensions) -> String {
    format!(
        concat!(
            r#"<div class="rte-page-break" contenteditable="false" data-page-break="true" "#,
            r#"style="margin-left: -{left}px; margin-right: -{right}px;">"#,
            r#"<div class="rte-page-break__bottom-margin" style="height: {bottom}px;"></div>"#,
            r#"<div class="rte-page-break__edge-bottom"></div>"#,
            r#"<div class="rte-page-break__gap" style="height: {gap}px;">"#,
            r#"<div class="rte-page-break__page-number">{number}</div>"#,
            r#"</div>"#,
            r#"<div class="rte-page-break__edge-top"></div>"#,
            r#"<div class="rte-page-break__top-margin" style="height: {top}px;"></div>"#,
            r#"</div>"#
        ),
        left = dims.margin.left,
        right = dims.margin.right,
        bottom = dims.margin.bottom,
        gap = PAGE_GAP,
        number = page_number,
        top = dims.margin.top,
    )
}

/// Render the document as the editing view shows it: page break widgets in
/// front of the blocks they precede, and the placeholder on an empty document.
pub fn decorated_html(doc: &Document, pagination: &PaginationState, placeholder: &str) -> String {
    let mut markers: Vec<_> = pagination.markers.iter().collect();
    markers.sort_by_key(|m| m.pos);
    let mut markers = markers.into_iter().peekable();

    let show_placeholder = doc.block_count() == 1
        && doc.blocks()[0].kind == BlockKind::Paragraph
        && doc.blocks()[0].is_empty();

    let mut out = String::new();
    for (pos, block) in doc.blocks_with_offsets() {
        while let Some(marker) = markers.next_if(|m| m.pos <= pos) {
            out.push_str(&marker.widget_html());
        }

        if show_placeholder {
            let mut block = block.clone();
            let class = class_names([block.attr("class"), Some(EMPTY_CLASS)]);
            block.attrs.retain(|(key, _)| key != "class" && key != "data-placeholder");
            block.attrs.push(("class".to_string(), class));
            block
                .attrs
                .push(("data-placeholder".to_string(), placeholder.to_string()));
            out.push_str(&block.outer_html());
        } else {
            out.push_str(&block.outer_html());
        }
    }

    // Markers mapped past the last block
    for marker in markers {
        out.push_str(&marker.widget_html());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::html;
    use crate::layout::{PageBreakMarker, A4};

    #[test]
    fn test_widget_structure() {
        let widget = page_break_html(3, &A4);
        let el = html::parse_element(&widget).unwrap().unwrap();

        assert!(el.has_class("rte-page-break"));
        assert_eq!(el.attr("contenteditable"), Some("false"));
        assert_eq!(el.attr("data-page-break"), Some("true"));
        assert_eq!(
            el.attr("style"),
            Some("margin-left: -96px; margin-right: -96px;")
        );

        let parts: Vec<_> = el
            .child_elements()
            .map(|c| c.attr("class").unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            parts,
            vec![
                "rte-page-break__bottom-margin",
                "rte-page-break__edge-bottom",
                "rte-page-break__gap",
                "rte-page-break__edge-top",
                "rte-page-break__top-margin",
            ]
        );
        assert_eq!(el.inline_text(), "3");
    }

    #[test]
    fn test_widgets_inserted_before_blocks() {
        let doc = Document::from_html("<p>a</p><p>b</p>").unwrap();
        let state = PaginationState::from_markers(vec![PageBreakMarker {
            pos: doc.block_start(1),
            page_number: 1,
            block_id: None,
            dims: A4,
        }]);

        let out = decorated_html(&doc, &state, "Start typing...");
        let widget = page_break_html(1, &A4);
        assert_eq!(out, format!("<p>a</p>{}<p>b</p>", widget));
    }

    #[test]
    fn test_placeholder_on_empty_document() {
        let doc = Document::new();
        let out = decorated_html(&doc, &PaginationState::default(), "Write here");
        assert_eq!(
            out,
            r#"<p class="is-editor-empty" data-placeholder="Write here"></p>"#
        );

        let doc = Document::from_html("<p>text</p>").unwrap();
        assert_eq!(
            decorated_html(&doc, &PaginationState::default(), "Write here"),
            "<p>text</p>"
        );
    }
}
