//! Undo/Redo history for content-changing transactions
//!
//! Only transactions that change content and keep `add_to_history` are
//! recorded. Decoration updates never reach this module.

use crate::editing::{Selection, Step, Transaction};

/// A committed transaction that can be undone/redone
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Description of the operation
    pub description: String,
    /// Forward steps
    pub forward: Vec<Step>,
    /// Steps that undo `forward`, in application order
    pub inverse: Vec<Step>,
    /// Selection state before the transaction
    pub selection_before: Selection,
    /// Selection state after the transaction
    pub selection_after: Selection,
}

/// Undo/Redo manager
pub struct UndoManager {
    /// Stack of undoable entries
    undo_stack: Vec<HistoryEntry>,
    /// Stack of redoable entries
    redo_stack: Vec<HistoryEntry>,
    /// Maximum history depth
    max_depth: usize,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record a committed transaction
    pub fn record(&mut self, entry: HistoryEntry) {
        if entry.forward.is_empty() {
            return;
        }

        // Clear redo stack on new edit
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        // Enforce depth limit
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Take the last entry and build the transaction that reverts it
    pub fn undo(&mut self) -> Option<Transaction> {
        let entry = self.undo_stack.pop()?;

        let mut tr = Transaction::new(format!("undo {}", entry.description)).without_history();
        tr.steps = entry.inverse.clone();
        tr.selection = Some((entry.selection_before.anchor, entry.selection_before.head));

        // Move to redo stack
        self.redo_stack.push(entry);
        Some(tr)
    }

    /// Take the last undone entry and build the transaction that reapplies it
    pub fn redo(&mut self) -> Option<Transaction> {
        let entry = self.redo_stack.pop()?;

        let mut tr = Transaction::new(format!("redo {}", entry.description)).without_history();
        tr.steps = entry.forward.clone();
        tr.selection = Some((entry.selection_after.anchor, entry.selection_after.head));

        // Move to undo stack
        self.undo_stack.push(entry);
        Some(tr)
    }

    /// Put an entry back after its undo transaction was rejected
    pub(crate) fn restore_undo(&mut self) {
        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push(entry);
        }
    }

    /// Put an entry back after its redo transaction was rejected
    pub(crate) fn restore_redo(&mut self) {
        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(entry);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
