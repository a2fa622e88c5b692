//! Job processor: drives one job through the summary and checklist stages.

pub mod checklist;
mod error;
mod runner;

pub use checklist::parse_checklist;
pub use error::StageError;
pub use runner::{JobProcessor, ProcessOutcome};
