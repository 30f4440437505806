use crate::rules::Rule;
use repovet_host::{HostPort, Repository};
use repovet_types::ValidationResult;
use tracing::debug;

const CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

/// `.github/CODEOWNERS` must exist on the default branch with non-blank
/// content. Absence fails the rule, unlike the pipeline-file rule — each
/// rule owns its absence policy.
pub struct HasCodeowners;

impl HasCodeowners {
    pub const NAME: &'static str = "Missing CODEOWNERS";
}

impl Rule for HasCodeowners {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_valid(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
    ) -> anyhow::Result<ValidationResult> {
        let content = host.file_content(
            &repo.owner,
            &repo.name,
            CODEOWNERS_PATH,
            &repo.default_branch,
        )?;

        let result = match content {
            None => {
                debug!(repository = %repo.full_name(), "no CODEOWNERS found");
                ValidationResult::new(
                    Self::NAME,
                    "Add CODEOWNERS file to .github directory.",
                    false,
                )
            }
            Some(text) => ValidationResult::new(
                Self::NAME,
                "Add CODEOWNERS file to .github directory & add at least one owner.",
                !text.trim().is_empty(),
            ),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::repository;
    use repovet_host::InMemoryHost;

    #[test]
    fn missing_file_is_invalid() {
        let host = InMemoryHost::new();
        let repo = repository("org", "repo");
        let result = HasCodeowners.is_valid(&host, &repo).expect("rule");
        assert!(!result.is_valid);
    }

    #[test]
    fn blank_file_is_invalid() {
        let mut host = InMemoryHost::new();
        host.add_file("org/repo", "main", ".github/CODEOWNERS", "  \n\t\n");
        let repo = repository("org", "repo");
        assert!(!HasCodeowners.is_valid(&host, &repo).expect("rule").is_valid);
    }

    #[test]
    fn file_with_owners_is_valid() {
        let mut host = InMemoryHost::new();
        host.add_file("org/repo", "main", ".github/CODEOWNERS", "* @org/maintainers\n");
        let repo = repository("org", "repo");
        assert!(HasCodeowners.is_valid(&host, &repo).expect("rule").is_valid);
    }

    #[test]
    fn reads_from_the_default_branch() {
        let mut host = InMemoryHost::new();
        host.add_file("org/repo", "trunk", ".github/CODEOWNERS", "* @owner\n");
        let mut repo = repository("org", "repo");
        repo.default_branch = "trunk".into();
        assert!(HasCodeowners.is_valid(&host, &repo).expect("rule").is_valid);
    }
}
