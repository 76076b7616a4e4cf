//! Small helpers shared by the editor, pagination and preview

mod class_names;
mod debounce;

pub use class_names::class_names;
pub use debounce::{current_timestamp, Clock, Debouncer, ManualClock, SystemClock};
