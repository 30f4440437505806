use repovet_host::{HostPort, Repository};
use repovet_types::ValidationResult;

mod codeowners;
mod license;
pub(crate) mod pinned_library;
mod stale_branches;

pub use codeowners::HasCodeowners;
pub use license::HasLicense;
pub use pinned_library::{HasNewestPinnedLibrary, PinnedLibrary};
pub use stale_branches::HasNotManyStaleBranches;

/// Common contract for all validation rules.
pub trait Rule {
    /// Stable, human-readable identity. Doubles as the ignore-config key and
    /// the issue-title suffix, so it must not change between releases.
    fn name(&self) -> &str;

    /// One-time setup before any `is_valid` call in a run. Idempotent across
    /// repeated calls; a rule that cannot establish its baseline cannot
    /// meaningfully validate, so failures here are fatal for the run.
    fn init(&mut self, _host: &dyn HostPort) -> anyhow::Result<()> {
        Ok(())
    }

    /// Evaluate one repository without mutating remote state. Expected
    /// absences (missing file, missing directory, empty repository) fold
    /// into the result; only unexpected remote errors propagate.
    fn is_valid(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
    ) -> anyhow::Result<ValidationResult>;
}

/// The fixed catalog, in report order.
pub fn builtin_rules(pinned: PinnedLibrary) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(HasLicense),
        Box::new(HasCodeowners),
        Box::new(HasNotManyStaleBranches),
        Box::new(HasNewestPinnedLibrary::new(pinned)),
    ]
}

#[cfg(test)]
pub(crate) mod testutil {
    use repovet_host::Repository;

    pub fn repository(owner: &str, name: &str) -> Repository {
        Repository {
            owner: owner.into(),
            name: name.into(),
            html_url: format!("https://example.invalid/{owner}/{name}"),
            private: false,
            license: None,
            default_branch: "main".into(),
        }
    }
}
