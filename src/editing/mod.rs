//! Editing model: selection, steps, transactions and mutation filters

mod filter;
mod mapping;
mod operation;
mod selection;

pub use filter::{DocumentProtection, MutationFilter};
pub use mapping::{Assoc, MapRange, MapResult, Mapping, StepMap};
pub use operation::{Step, Transaction, TransactionMeta};
pub use selection::Selection;
