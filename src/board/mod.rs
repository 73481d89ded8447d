pub mod types;
pub mod palette;
pub mod store;
pub mod drag;
pub mod compiler;

pub use types::{Assignment, AssignmentBatch, Board, Card, ColumnId, DragSession, LabelOutcome};
pub use palette::{ColorSource, RngColorSource};
pub use store::BoardStore;
pub use compiler::{compile_assignments, unlabeled_completed, Compiled};
