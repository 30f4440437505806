use serde::Serialize;

/// Outcome of one rule evaluated against one repository.
///
/// Immutable once produced. The attached [`FixKind`] is a description of the
/// available remediation, not a callback: the caller decides whether to run
/// it, with an explicit host handle.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub rule_name: String,
    pub how_to_fix: String,
    pub is_valid: bool,
    pub fix: FixKind,
}

impl ValidationResult {
    pub fn new(rule_name: impl Into<String>, how_to_fix: impl Into<String>, is_valid: bool) -> Self {
        Self {
            rule_name: rule_name.into(),
            how_to_fix: how_to_fix.into(),
            is_valid,
            fix: FixKind::None,
        }
    }

    pub fn with_fix(mut self, fix: FixKind) -> Self {
        self.fix = fix;
        self
    }
}

/// Remediation attached to a result, as data rather than a closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixKind {
    /// No automated remediation for this rule.
    None,
    /// Rewrite the pinned `'{library}@{version}'` tag in a build-pipeline
    /// file and open a pull request with the change.
    PinnedLibraryUpdate {
        library: String,
        file_path: String,
        expected_version: String,
    },
}

impl FixKind {
    pub fn is_none(&self) -> bool {
        matches!(self, FixKind::None)
    }
}
