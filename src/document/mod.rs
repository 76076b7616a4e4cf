//! Document model: an ordered sequence of top-level blocks

mod block;
pub mod html;

pub use block::{Block, BlockId, BlockKind};
pub use html::{HtmlElement, HtmlNode, TopLevelNode};

use crate::error::HtmlError;
use serde_json::{json, Value};
use tracing::debug;

/// The main document structure
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    /// Monotonic version counter
    version: u64,
    /// Next block ID to assign
    next_block_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new document holding one empty paragraph
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.push_block(Block::new(BlockKind::Paragraph, ""));
        doc
    }

    /// Create a document with no blocks at all
    pub fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            version: 0,
            next_block_id: 0,
        }
    }

    /// Create a document from a list of blocks
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut doc = Self::empty();
        for block in blocks {
            doc.push_block(block);
        }
        doc
    }

    /// Parse a document from HTML.
    ///
    /// Each top-level element becomes a block and keeps its inner markup
    /// verbatim. Loose top-level text becomes a paragraph.
    pub fn from_html(source: &str) -> Result<Self, HtmlError> {
        let nodes = html::parse_fragment(source)?;
        let mut doc = Self::empty();

        for top in &nodes {
            let markup = top.source(source);
            let block = match &top.node {
                HtmlNode::Element(element) => {
                    Block::from_element(element, inner_markup(markup, &element.tag))
                }
                node => match block::text_block(node, markup) {
                    Some(block) => block,
                    None => continue,
                },
            };
            doc.push_block(block);
        }

        debug!(blocks = doc.block_count(), "Parsed document from HTML");
        Ok(doc)
    }

    fn push_block(&mut self, mut block: Block) {
        block.id = self.allocate_id();
        self.blocks.push(block);
    }

    /// Reserve a fresh block ID
    pub(crate) fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }

    /// Get the document version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Number of top-level blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All top-level blocks in order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    /// Get a block by index
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Total number of positions in the document
    pub fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::node_size).sum()
    }

    /// Iterate blocks with the position right before each of them
    pub fn blocks_with_offsets(&self) -> impl Iterator<Item = (usize, &Block)> + '_ {
        self.blocks.iter().scan(0usize, |offset, block| {
            let start = *offset;
            *offset += block.node_size();
            Some((start, block))
        })
    }

    /// Position right before the block at `index`
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks[..index.min(self.blocks.len())]
            .iter()
            .map(Block::node_size)
            .sum()
    }

    /// Resolve a position to `(block index, offset in block content)`.
    ///
    /// Only positions inside a non-leaf block's content resolve.
    pub fn resolve(&self, pos: usize) -> Option<(usize, usize)> {
        for (index, (start, block)) in self.blocks_with_offsets().enumerate() {
            if block.kind.is_leaf() {
                continue;
            }
            let content_start = start + 1;
            let content_end = content_start + block.content_size();
            if pos >= content_start && pos <= content_end {
                return Some((index, pos - content_start));
            }
        }
        None
    }


    /// Render the document as HTML
    pub fn to_html(&self) -> String {
        self.blocks.iter().map(Block::outer_html).collect()
    }

    /// Render the document as a JSON tree
    pub fn to_json(&self) -> Value {
        json!({
            "type": "doc",
            "content": self.blocks.iter().map(Block::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Strip the outer tags from an element's source markup
fn inner_markup<'a>(markup: &'a str, tag: &str) -> &'a str {
    let open_end = match markup.find('>') {
        Some(idx) => idx + 1,
        None => return "",
    };
    let rest = &markup[open_end..];
    let close = format!("</{}", tag);

    match rest.to_ascii_lowercase().rfind(&close) {
        Some(idx) => &rest[..idx],
        None => rest,
    }
}
