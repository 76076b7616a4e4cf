//! Mutation filters evaluated before a transaction commits

use crate::document::Document;
use crate::editing::Transaction;

/// A predicate over a proposed transaction and the state it would produce.
///
/// Filters must be pure: they run synchronously inside dispatch and their
/// only effect is the verdict.
pub trait MutationFilter {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Return `false` to drop the transaction
    fn allow(&self, tr: &Transaction, next: &Document) -> bool;
}

/// Keeps the document from ever ending up without a block.
///
/// Transactions that leave content alone (selection moves, decoration
/// updates) always pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentProtection;

impl MutationFilter for DocumentProtection {
    fn name(&self) -> &'static str {
        "documentProtection"
    }

    fn allow(&self, tr: &Transaction, next: &Document) -> bool {
        if !tr.doc_changed() {
            return true;
        }
        next.block_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Step;

    #[test]
    fn test_rejects_emptying_document() {
        let doc = Document::from_html("<p>only</p>").unwrap();
        let tr = Transaction::new("delete all").step(Step::delete_blocks(0, 1));
        let (next, _) = tr.apply_to(&doc).unwrap();
        assert!(!DocumentProtection.allow(&tr, &next));
    }

    #[test]
    fn test_allows_deleting_one_of_two() {
        let doc = Document::from_html("<p>a</p><p>b</p>").unwrap();
        let tr = Transaction::new("delete one").step(Step::delete_blocks(0, 1));
        let (next, _) = tr.apply_to(&doc).unwrap();
        assert!(DocumentProtection.allow(&tr, &next));
    }

    #[test]
    fn test_meta_only_always_allowed() {
        let tr = Transaction::new("select").select(0, 0);
        assert!(DocumentProtection.allow(&tr, &Document::empty()));
    }
}
