//! Block-level element metadata

use crate::document::html::{self, HtmlElement, HtmlNode};
use serde_json::{json, Map, Value};

/// Stable identifier for a top-level block that survives edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockId(pub u64);

/// The kind of block element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    Image,
    Table,
    /// Any other element, kept by tag name
    Other(String),
}

impl BlockKind {
    /// Map a tag name to a block kind
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p" => BlockKind::Paragraph,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading {
                level: tag[1..].parse().unwrap_or(1),
            },
            "ul" => BlockKind::BulletList,
            "ol" => BlockKind::OrderedList,
            "blockquote" => BlockKind::Blockquote,
            "pre" => BlockKind::CodeBlock,
            "hr" => BlockKind::HorizontalRule,
            "img" => BlockKind::Image,
            "table" => BlockKind::Table,
            other => BlockKind::Other(other.to_string()),
        }
    }

    /// Tag name used when rendering this block
    pub fn tag(&self) -> &str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading { level } => match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            BlockKind::BulletList => "ul",
            BlockKind::OrderedList => "ol",
            BlockKind::Blockquote => "blockquote",
            BlockKind::CodeBlock => "pre",
            BlockKind::HorizontalRule => "hr",
            BlockKind::Image => "img",
            BlockKind::Table => "table",
            BlockKind::Other(tag) => tag.as_str(),
        }
    }

    /// Node type name in the JSON tree
    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading { .. } => "heading",
            BlockKind::BulletList => "bulletList",
            BlockKind::OrderedList => "orderedList",
            BlockKind::Blockquote => "blockquote",
            BlockKind::CodeBlock => "codeBlock",
            BlockKind::HorizontalRule => "horizontalRule",
            BlockKind::Image => "image",
            BlockKind::Table => "table",
            BlockKind::Other(tag) => tag.as_str(),
        }
    }

    /// Leaf blocks have no content and occupy a single position
    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockKind::HorizontalRule | BlockKind::Image)
            || matches!(self, BlockKind::Other(tag) if html::is_void(tag))
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }
}

/// A top-level block of the document
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub attrs: Vec<(String, String)>,
    /// Inner HTML, kept verbatim
    pub content: String,
}

impl Block {
    /// Create a block with the given content
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::default(),
            kind,
            attrs: Vec::new(),
            content: content.into(),
        }
    }

    /// Create a paragraph holding escaped plain text
    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockKind::Paragraph, html::escape(text))
    }

    /// Create a heading holding escaped plain text
    pub fn heading(level: u8, text: &str) -> Self {
        Self::new(
            BlockKind::Heading {
                level: level.clamp(1, 6),
            },
            html::escape(text),
        )
    }

    /// Create an image block
    pub fn image(src: &str, width: Option<u32>, height: Option<u32>) -> Self {
        let mut block = Self::new(BlockKind::Image, "");
        block.attrs.push(("src".to_string(), src.to_string()));
        if let Some(w) = width {
            block.attrs.push(("width".to_string(), w.to_string()));
        }
        if let Some(h) = height {
            block.attrs.push(("height".to_string(), h.to_string()));
        }
        block
    }

    /// Build a block from a source element and its exact inner markup
    pub fn from_element(element: &HtmlElement, inner_html: &str) -> Self {
        let kind = BlockKind::from_tag(&element.tag);
        let content = if kind.is_leaf() {
            String::new()
        } else {
            inner_html.to_string()
        };

        Self {
            id: BlockId::default(),
            kind,
            attrs: element.attrs.clone(),
            content,
        }
    }

    /// Number of positions inside the block
    pub fn content_size(&self) -> usize {
        if self.kind.is_leaf() {
            0
        } else {
            self.content.chars().count()
        }
    }

    /// Number of positions the block occupies in the document
    pub fn node_size(&self) -> usize {
        if self.kind.is_leaf() {
            1
        } else {
            self.content_size() + 2
        }
    }

    /// Byte index of a character offset within the content
    pub fn byte_index(&self, char_offset: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.content.len())
    }

    /// Look up an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Render the block as HTML
    pub fn outer_html(&self) -> String {
        let tag = self.kind.tag();
        let mut out = format!("<{}", tag);
        for (key, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", key, html::escape(value)));
        }
        out.push('>');

        if !self.kind.is_leaf() {
            out.push_str(&self.content);
            out.push_str(&format!("</{}>", tag));
        }

        out
    }

    /// Check if the block has no visible content
    pub fn is_empty(&self) -> bool {
        !self.kind.is_leaf() && self.plain_text().trim().is_empty()
    }

    /// Plain text of the block's content
    pub fn plain_text(&self) -> String {
        match html::parse_element(&self.outer_html()) {
            Ok(Some(element)) => element.inline_text(),
            _ => self.content.clone(),
        }
    }

    /// Node in the JSON tree
    pub fn to_json(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".to_string(), json!(self.kind.type_name()));

        let mut attrs = Map::new();
        if let BlockKind::Heading { level } = self.kind {
            attrs.insert("level".to_string(), json!(level));
        }
        for (key, value) in &self.attrs {
            attrs.insert(key.clone(), json!(value));
        }
        if !attrs.is_empty() {
            node.insert("attrs".to_string(), Value::Object(attrs));
        }

        if !self.kind.is_leaf() {
            let text = self.plain_text();
            let content = if text.is_empty() {
                Vec::new()
            } else {
                vec![json!({ "type": "text", "text": text })]
            };
            node.insert("content".to_string(), Value::Array(content));
        }

        Value::Object(node)
    }
}

/// Convert a top-level text run into a paragraph
pub(crate) fn text_block(node: &HtmlNode, source: &str) -> Option<Block> {
    match node {
        HtmlNode::Text(_) => Some(Block::new(BlockKind::Paragraph, source.trim())),
        HtmlNode::Element(_) => None,
    }
}
