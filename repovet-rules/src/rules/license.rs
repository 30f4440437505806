use crate::rules::Rule;
use repovet_host::{HostPort, Repository};
use repovet_types::ValidationResult;
use tracing::debug;

const HOW_TO_FIX: &str = "Add a license for this repository. \
See https://help.github.com/en/articles/licensing-a-repository for guidance. \
Private repositories don't need a license.";

/// Public repositories must expose a license; private ones are exempt.
pub struct HasLicense;

impl HasLicense {
    pub const NAME: &'static str = "Missing License";
}

impl Rule for HasLicense {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_valid(
        &self,
        _host: &dyn HostPort,
        repo: &Repository,
    ) -> anyhow::Result<ValidationResult> {
        if repo.private {
            debug!(repository = %repo.full_name(), "private repository, license exempt");
            return Ok(ValidationResult::new(Self::NAME, HOW_TO_FIX, true));
        }
        let valid = repo.license.is_some();
        debug!(repository = %repo.full_name(), license = ?repo.license, valid, "license check");
        Ok(ValidationResult::new(Self::NAME, HOW_TO_FIX, valid))
    }
}
