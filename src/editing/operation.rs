//! Edit operations and transactions

use crate::document::{html, Block, Document};
use crate::editing::mapping::{Mapping, StepMap};
use crate::error::StepError;
use crate::layout::PaginationState;

/// An atomic edit operation
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Insert markup at a position inside block content
    InsertText { pos: usize, text: String },
    /// Delete a range inside one block's content
    DeleteText { from: usize, to: usize },
    /// Replace the top-level blocks `from..to` (block indices)
    ReplaceBlocks {
        from: usize,
        to: usize,
        blocks: Vec<Block>,
    },
}

impl Step {
    /// Insert plain text, escaping markup characters
    pub fn insert_text(pos: usize, text: &str) -> Self {
        Self::InsertText {
            pos,
            text: html::escape(text).into_owned(),
        }
    }

    /// Delete a content range
    pub fn delete_text(from: usize, to: usize) -> Self {
        Self::DeleteText { from, to }
    }

    /// Replace a range of blocks
    pub fn replace_blocks(from: usize, to: usize, blocks: Vec<Block>) -> Self {
        Self::ReplaceBlocks { from, to, blocks }
    }

    /// Delete a range of blocks
    pub fn delete_blocks(from: usize, to: usize) -> Self {
        Self::ReplaceBlocks {
            from,
            to,
            blocks: Vec::new(),
        }
    }

    /// Apply the step, returning how positions moved
    pub fn apply(&self, doc: &mut Document) -> Result<StepMap, StepError> {
        match self {
            Step::InsertText { pos, text } => {
                let (index, offset) = resolve(doc, *pos)?;
                let block = &mut doc.blocks_mut()[index];
                let byte = block.byte_index(offset);
                block.content.insert_str(byte, text);
                Ok(StepMap::replace(*pos, 0, text.chars().count()))
            }
            Step::DeleteText { from, to } => {
                if from >= to {
                    return Ok(StepMap::identity());
                }
                let (index, start) = resolve(doc, *from)?;
                let (end_index, end) = resolve(doc, *to)?;
                if index != end_index {
                    return Err(StepError::CrossesBlocks {
                        from: *from,
                        to: *to,
                    });
                }
                let block = &mut doc.blocks_mut()[index];
                let start_byte = block.byte_index(start);
                let end_byte = block.byte_index(end);
                block.content.replace_range(start_byte..end_byte, "");
                Ok(StepMap::replace(*from, to - from, 0))
            }
            Step::ReplaceBlocks { from, to, blocks } => {
                let len = doc.block_count();
                if from > to || *to > len {
                    return Err(StepError::BlockRangeOutOfBounds {
                        from: *from,
                        to: *to,
                        len,
                    });
                }
                let start = doc.block_start(*from);
                let old_size: usize = doc.blocks()[*from..*to]
                    .iter()
                    .map(Block::node_size)
                    .sum();

                // Replaced blocks may hand their IDs on; anything else that
                // collides gets a fresh one.
                let mut inserted = blocks.clone();
                for i in 0..inserted.len() {
                    let id = inserted[i].id;
                    let taken = doc.blocks()[..*from]
                        .iter()
                        .chain(&doc.blocks()[*to..])
                        .chain(&inserted[..i])
                        .any(|b| b.id == id);
                    if taken {
                        inserted[i].id = doc.allocate_id();
                    }
                }
                let new_size: usize = inserted.iter().map(Block::node_size).sum();

                doc.blocks_mut().splice(*from..*to, inserted);
                Ok(StepMap::replace(start, old_size, new_size))
            }
        }
    }

    /// Compute the step that undoes this one, given the document before it
    pub fn invert(&self, before: &Document) -> Result<Step, StepError> {
        match self {
            Step::InsertText { pos, text } => Ok(Step::DeleteText {
                from: *pos,
                to: pos + text.chars().count(),
            }),
            Step::DeleteText { from, to } => {
                let (index, start) = resolve(before, *from)?;
                let (_, end) = resolve(before, *to)?;
                let block = &before.blocks()[index];
                let removed = block.content[block.byte_index(start)..block.byte_index(end)]
                    .to_string();
                Ok(Step::InsertText {
                    pos: *from,
                    text: removed,
                })
            }
            Step::ReplaceBlocks { from, to, blocks } => {
                let len = before.block_count();
                if from > to || *to > len {
                    return Err(StepError::BlockRangeOutOfBounds {
                        from: *from,
                        to: *to,
                        len,
                    });
                }
                Ok(Step::ReplaceBlocks {
                    from: *from,
                    to: from + blocks.len(),
                    blocks: before.blocks()[*from..*to].to_vec(),
                })
            }
        }
    }
}

fn resolve(doc: &Document, pos: usize) -> Result<(usize, usize), StepError> {
    let size = doc.content_size();
    if pos > size {
        return Err(StepError::PositionOutOfRange { pos, size });
    }
    doc.resolve(pos).ok_or(StepError::NotInTextblock { pos })
}

/// Metadata carried by a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMeta {
    /// Record content changes in the undo history
    pub add_to_history: bool,
    /// Replacement pagination decorations
    pub pagination: Option<PaginationState>,
}

impl Default for TransactionMeta {
    fn default() -> Self {
        Self {
            add_to_history: true,
            pagination: None,
        }
    }
}

/// A proposed document mutation: steps plus metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub meta: TransactionMeta,
    /// New selection anchor and head, if the transaction moves it
    pub selection: Option<(usize, usize)>,
    /// Description for the undo history
    pub description: String,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Exclude this transaction from the undo history
    pub fn without_history(mut self) -> Self {
        self.meta.add_to_history = false;
        self
    }

    /// Attach replacement pagination decorations
    pub fn with_pagination(mut self, state: PaginationState) -> Self {
        self.meta.pagination = Some(state);
        self
    }

    /// Move the selection
    pub fn select(mut self, anchor: usize, head: usize) -> Self {
        self.selection = Some((anchor, head));
        self
    }

    /// Check if the transaction changes document content
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply every step to a copy of `doc`, producing the candidate state
    pub fn apply_to(&self, doc: &Document) -> Result<(Document, Mapping), StepError> {
        let mut next = doc.clone();
        let mut mapping = Mapping::new();
        for step in &self.steps {
            mapping.push(step.apply(&mut next)?);
        }
        if self.doc_changed() {
            next.bump_version();
        }
        Ok((next, mapping))
    }

    /// Steps that undo this transaction, in the order they must be applied
    pub fn invert(&self, before: &Document) -> Result<Vec<Step>, StepError> {
        let mut doc = before.clone();
        let mut inverted = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            inverted.push(step.invert(&doc)?);
            step.apply(&mut doc)?;
        }
        inverted.reverse();
        Ok(inverted)
    }
}
