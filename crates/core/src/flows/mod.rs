pub mod engine;
pub mod states;
pub mod summary;

pub use engine::{validate_age, WorkflowEngine, MAX_AGE, MIN_AGE};
pub use states::{MenuChoice, StateKind, WorkflowState};
pub use summary::{SummaryRow, SummaryTable};
