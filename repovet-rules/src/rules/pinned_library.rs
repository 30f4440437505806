use crate::rules::Rule;
use crate::version::ReleaseVersionFetcher;
use anyhow::Context;
use regex::{Regex, RegexBuilder};
use repovet_host::{HostPort, Repository};
use repovet_types::{FixKind, ValidationResult};
use tracing::{debug, info};

/// Coordinates of the pinned dependency a fleet of repositories shares.
#[derive(Debug, Clone)]
pub struct PinnedLibrary {
    /// Owner of the repository that publishes the library's releases.
    pub source_owner: String,
    /// Name of that repository.
    pub source_repo: String,
    /// Name used in the pin, e.g. `jenkins-ptcs-library`.
    pub library: String,
    /// Build-pipeline file in the audited repository's root, e.g. `Jenkinsfile`.
    pub pipeline_file: String,
}

/// Matches `'{library}@{version}'` and captures the version verbatim.
pub(crate) fn version_pattern(library: &str) -> Regex {
    RegexBuilder::new(&format!(r"'{}@(\d+\.\d+\.\d+[^']*)'", regex::escape(library)))
        .case_insensitive(true)
        .build()
        .expect("pin pattern is valid for any escaped library name")
}

/// The build pipeline, if it pins the shared library at all, must pin the
/// latest published release.
///
/// Version strings compare verbatim, no semantic-version ordering. A missing
/// pipeline file or a pipeline that never mentions the library passes by
/// default: repositories that do not use the library have nothing to update.
pub struct HasNewestPinnedLibrary {
    name: String,
    config: PinnedLibrary,
    pattern: Regex,
    expected_version: Option<String>,
}

impl HasNewestPinnedLibrary {
    pub fn new(config: PinnedLibrary) -> Self {
        Self {
            name: format!("Old {}", config.library),
            pattern: version_pattern(&config.library),
            config,
            expected_version: None,
        }
    }

    fn how_to_fix(&self) -> String {
        format!("Update {} to newest version.", self.config.library)
    }
}

impl Rule for HasNewestPinnedLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, host: &dyn HostPort) -> anyhow::Result<()> {
        let fetcher =
            ReleaseVersionFetcher::new(&self.config.source_owner, &self.config.source_repo);
        let release = fetcher.latest(host)?;
        info!(rule = %self.name, version = %release.tag_name, "resolved newest library version");
        self.expected_version = Some(release.tag_name);
        Ok(())
    }

    fn is_valid(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
    ) -> anyhow::Result<ValidationResult> {
        let expected = self
            .expected_version
            .as_deref()
            .with_context(|| format!("rule {} used before init", self.name))?;

        let content = host.file_content(
            &repo.owner,
            &repo.name,
            &self.config.pipeline_file,
            &repo.default_branch,
        )?;

        let Some(content) = content else {
            debug!(repository = %repo.full_name(), file = %self.config.pipeline_file, "no pipeline file, skipping");
            return Ok(ValidationResult::new(&self.name, self.how_to_fix(), true));
        };

        let Some(captures) = self.pattern.captures(&content) else {
            debug!(repository = %repo.full_name(), "pipeline does not pin the library, skipping");
            return Ok(ValidationResult::new(&self.name, self.how_to_fix(), true));
        };

        let pinned = &captures[1];
        debug!(repository = %repo.full_name(), pinned, expected, "pinned version check");

        Ok(
            ValidationResult::new(&self.name, self.how_to_fix(), pinned == expected).with_fix(
                FixKind::PinnedLibraryUpdate {
                    library: self.config.library.clone(),
                    file_path: self.config.pipeline_file.clone(),
                    expected_version: expected.to_string(),
                },
            ),
        )
    }
}
