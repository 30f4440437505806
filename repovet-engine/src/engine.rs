use repovet_host::{HostError, HostPort, Repository};
use repovet_rules::{builtin_rules, PinnedLibrary, Rule};
use repovet_types::ignore::{IgnoreConfig, IGNORE_FILE};
use repovet_types::{RuleFailure, ValidationReport};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("remote call failed: {0}")]
    Host(#[from] HostError),

    /// Malformed ignore file: a configuration error the repository's owners
    /// must fix, distinct from the file simply being absent.
    #[error("ignore config in {repository} is malformed: {source}")]
    IgnoreConfig {
        repository: String,
        #[source]
        source: serde_json::Error,
    },

    /// A rule could not establish its baseline; the whole run is off.
    #[error("rule initialization failed: {0:#}")]
    Init(anyhow::Error),
}

/// Result of validating one repository: the report, plus any rules that
/// errored unexpectedly (a partial-failure condition, not an abort).
#[derive(Debug)]
pub struct EngineOutcome {
    pub report: ValidationReport,
    pub failures: Vec<RuleFailure>,
}

impl EngineOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the rule set against one repository, producing a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl ValidationEngine {
    pub fn new(pinned: PinnedLibrary) -> Self {
        Self {
            rules: builtin_rules(pinned),
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// One-time rule setup; must run before any validation in this run.
    pub fn init(&mut self, host: &dyn HostPort) -> Result<(), EngineError> {
        for rule in &mut self.rules {
            rule.init(host).map_err(EngineError::Init)?;
            debug!(rule = rule.name(), "rule initialized");
        }
        Ok(())
    }

    /// Fetch repository metadata by name, then validate.
    pub fn validate_by_name(
        &self,
        host: &dyn HostPort,
        owner: &str,
        name: &str,
        override_ignore: bool,
    ) -> Result<EngineOutcome, EngineError> {
        let repository = host.repository(owner, name)?;
        self.validate(host, &repository, override_ignore)
    }

    /// Run every applicable rule, in registration order.
    ///
    /// An individual rule's unexpected error is recorded and does not abort
    /// evaluation of the remaining rules.
    pub fn validate(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
        override_ignore: bool,
    ) -> Result<EngineOutcome, EngineError> {
        let ignore = self.load_ignore(host, repo)?;

        let mut results = Vec::with_capacity(self.rules.len());
        let mut failures = Vec::new();

        for rule in &self.rules {
            if !override_ignore && ignore.ignores(rule.name()) {
                debug!(repository = %repo.full_name(), rule = rule.name(), "rule ignored by repository config");
                continue;
            }
            match rule.is_valid(host, repo) {
                Ok(result) => results.push(result),
                Err(error) => {
                    warn!(
                        repository = %repo.full_name(),
                        rule = rule.name(),
                        error = %format!("{error:#}"),
                        "rule evaluation failed"
                    );
                    failures.push(RuleFailure {
                        rule_name: rule.name().to_string(),
                        error: format!("{error:#}"),
                    });
                }
            }
        }

        info!(
            repository = %repo.full_name(),
            results = results.len(),
            failures = failures.len(),
            "validation finished"
        );

        Ok(EngineOutcome {
            report: ValidationReport {
                owner: repo.owner.clone(),
                repository_name: repo.name.clone(),
                repository_url: repo.html_url.clone(),
                results,
            },
            failures,
        })
    }

    /// Best-effort ignore load: absent file means an empty ignore set, but a
    /// file that exists and fails to parse is a configuration error.
    fn load_ignore(
        &self,
        host: &dyn HostPort,
        repo: &Repository,
    ) -> Result<IgnoreConfig, EngineError> {
        let raw = host.file_content(&repo.owner, &repo.name, IGNORE_FILE, &repo.default_branch)?;
        match raw {
            None => Ok(IgnoreConfig::default()),
            Some(raw) => IgnoreConfig::parse(&raw).map_err(|source| EngineError::IgnoreConfig {
                repository: repo.full_name(),
                source,
            }),
        }
    }
}
