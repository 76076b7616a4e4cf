//! Display list: render-ready representation of laid out blocks

use crate::{Point, Rect};

/// Display representation of a list marker
#[derive(Debug, Clone, PartialEq)]
pub enum ListMarkerDisplay {
    Bullet,
    Number(String),
}

/// How a frame is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    /// Code block background
    Shaded,
    /// Quote bar on the left edge
    Bar,
    /// Table cell border
    Outline,
}

/// A display item to render
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    /// One laid out line of text; `origin` is the top-left of the line box
    TextLine {
        origin: Point,
        width: f32,
        font_size: f32,
        line_height: f32,
        text: String,
    },
    /// List marker (bullet or number)
    ListMarker {
        position: Point,
        font_size: f32,
        marker: ListMarkerDisplay,
    },
    /// Horizontal rule
    Rule { rect: Rect },
    /// Placeholder box for an image
    ImageBox { rect: Rect },
    /// Decorative frame
    Frame { rect: Rect, style: FrameStyle },
}

impl DisplayItem {
    /// Shift the item vertically
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            DisplayItem::TextLine { origin, .. } => {
                origin.x += dx;
                origin.y += dy;
            }
            DisplayItem::ListMarker { position, .. } => {
                position.x += dx;
                position.y += dy;
            }
            DisplayItem::Rule { rect }
            | DisplayItem::ImageBox { rect }
            | DisplayItem::Frame { rect, .. } => {
                rect.x += dx;
                rect.y += dy;
            }
        }
    }

    /// Bounding box of the item
    pub fn bounds(&self) -> Rect {
        match self {
            DisplayItem::TextLine {
                origin,
                width,
                line_height,
                ..
            } => Rect::new(origin.x, origin.y, *width, *line_height),
            DisplayItem::ListMarker {
                position,
                font_size,
                ..
            } => Rect::new(position.x, position.y, *font_size, *font_size),
            DisplayItem::Rule { rect }
            | DisplayItem::ImageBox { rect }
            | DisplayItem::Frame { rect, .. } => *rect,
        }
    }
}

/// Layout of one block: its box and what to paint inside it.
///
/// Item coordinates are relative to the top-left of the border box, so the
/// top margin is not included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockLayout {
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Border-box height
    pub height: f32,
    pub items: Vec<DisplayItem>,
}

impl BlockLayout {
    /// Height including vertical margins
    pub fn outer_height(&self) -> f32 {
        self.margin_top + self.height + self.margin_bottom
    }
}

/// Display list for a single page
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPage {
    pub page_index: usize,
    pub bounds: Rect,
    pub items: Vec<DisplayItem>,
}

impl DisplayPage {
    /// Create an empty page
    pub fn new(page_index: usize, width: f32, height: f32) -> Self {
        Self {
            page_index,
            bounds: Rect::new(0.0, 0.0, width, height),
            items: Vec::new(),
        }
    }

    /// Stack blocks from `origin` downward, applying each block's margins
    pub fn stack<I>(&mut self, origin: Point, blocks: I) -> f32
    where
        I: IntoIterator<Item = BlockLayout>,
    {
        let mut y = origin.y;
        for block in blocks {
            y += block.margin_top;
            for mut item in block.items {
                item.translate(origin.x, y);
                self.items.push(item);
            }
            y += block.height + block.margin_bottom;
        }
        y - origin.y
    }

    /// Items that overlap the page bounds
    pub fn visible_items(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items
            .iter()
            .filter(move |item| item.bounds().intersects(&self.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(y: f32) -> DisplayItem {
        DisplayItem::TextLine {
            origin: Point::new(0.0, y),
            width: 50.0,
            font_size: 14.0,
            line_height: 20.0,
            text: "text".to_string(),
        }
    }

    #[test]
    fn test_outer_height() {
        let layout = BlockLayout {
            margin_top: 4.0,
            margin_bottom: 12.0,
            height: 20.0,
            items: Vec::new(),
        };
        assert_eq!(layout.outer_height(), 36.0);
    }

    #[test]
    fn test_stack_applies_margins() {
        let mut page = DisplayPage::new(0, 200.0, 200.0);
        let blocks = vec![
            BlockLayout {
                margin_top: 0.0,
                margin_bottom: 10.0,
                height: 20.0,
                items: vec![line(0.0)],
            },
            BlockLayout {
                margin_top: 5.0,
                margin_bottom: 0.0,
                height: 20.0,
                items: vec![line(0.0)],
            },
        ];

        let used = page.stack(Point::new(10.0, 30.0), blocks);
        assert_eq!(used, 55.0);
        assert_eq!(page.items[0].bounds().y, 30.0);
        assert_eq!(page.items[1].bounds().y, 65.0);
        assert_eq!(page.items[1].bounds().x, 10.0);
    }

    #[test]
    fn test_visible_items() {
        let mut page = DisplayPage::new(0, 100.0, 100.0);
        page.items.push(line(10.0));
        page.items.push(line(500.0));
        assert_eq!(page.visible_items().count(), 1);
    }
}
