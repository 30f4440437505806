//! Validation engine: runs the rule catalog against one repository at a
//! time, honoring the repository's own ignore config, and assembles a
//! deterministic [`ValidationReport`](repovet_types::ValidationReport).

mod engine;

pub use engine::{EngineError, EngineOutcome, ValidationEngine};
