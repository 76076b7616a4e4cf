//! Read-only paged preview

use crate::layout::{flow, PageDimensions, PageFormat};
use crate::util::class_names;
use serde::Serialize;

/// One page of the preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPage {
    /// 1-based page number
    pub number: usize,
    pub total: usize,
    /// The page's share of the content
    pub content: String,
    /// The page wrapped for display, with its `N / total` indicator
    pub html: String,
}

fn page_wrapper(content: &str, number: usize, total: usize, dims: &PageDimensions) -> String {
    format!(
        concat!(
            r#"<div class="rte-preview__page-wrapper">"#,
            r#"<div class="rte-preview__page" style="width: {width}px; min-height: {height}px; "#,
            r#"padding: {top}px {right}px {bottom}px {left}px;">{content}</div>"#,
            r#"<div class="rte-preview__page-number">{number} / {total}</div>"#,
            r#"</div>"#
        ),
        width = dims.width,
        height = dims.height,
        top = dims.margin.top,
        right = dims.margin.right,
        bottom = dims.margin.bottom,
        left = dims.margin.left,
        content = content,
        number = number,
        total = total,
    )
}

/// Split content into preview pages for a page format
pub fn render_preview(content: &str, format: PageFormat) -> Vec<PreviewPage> {
    let dims = format.dimensions();
    let fragments = flow(content, &dims);
    let total = fragments.len();

    fragments
        .into_iter()
        .enumerate()
        .map(|(index, fragment)| {
            let number = index + 1;
            PreviewPage {
                number,
                total,
                html: page_wrapper(&fragment.html, number, total, &dims),
                content: fragment.html,
            }
        })
        .collect()
}

/// The whole preview as one `rte-preview` container
pub fn preview_html(content: &str, format: PageFormat, class_name: Option<&str>) -> String {
    let pages: String = render_preview(content, format)
        .into_iter()
        .map(|page| page.html)
        .collect();
    format!(
        r#"<div class="{}">{}</div>"#,
        class_names([Some("rte-preview"), class_name]),
        pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_has_one_page() {
        let pages = render_preview("", PageFormat::A4);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "");
        assert!(pages[0].html.contains("1 / 1"));
    }

    #[test]
    fn test_page_numbers() {
        let content = "<p>paragraph of text</p>".repeat(60);
        let pages = render_preview(&content, PageFormat::A4);

        assert_eq!(pages.len(), 3);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.number, i + 1);
            assert_eq!(page.total, 3);
            assert!(page.html.contains(&format!("{} / 3", i + 1)));
        }
    }

    #[test]
    fn test_page_padding_follows_format() {
        let pages = render_preview("<p>x</p>", PageFormat::Letter);
        assert!(pages[0]
            .html
            .contains("width: 816px; min-height: 1056px; padding: 96px 96px 96px 96px;"));
    }

    #[test]
    fn test_preview_container_class() {
        let html = preview_html("<p>x</p>", PageFormat::A4, Some("dark"));
        assert!(html.starts_with(r#"<div class="rte-preview dark">"#));
        let html = preview_html("<p>x</p>", PageFormat::A4, None);
        assert!(html.starts_with(r#"<div class="rte-preview">"#));
    }
}
