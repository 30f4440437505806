use crate::result::ValidationResult;
use serde::Serialize;

/// Per-repository outcome of one validation run.
///
/// Results preserve rule registration order so output is deterministic.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub owner: String,
    pub repository_name: String,
    pub repository_url: String,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository_name)
    }
}

/// A rule that errored during evaluation (not an absence condition).
///
/// Recorded by the engine without aborting sibling rules.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    pub rule_name: String,
    pub error: String,
}
