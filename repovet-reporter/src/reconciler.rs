use repovet_host::{HostError, HostPort, IssueState, NewIssue};
use repovet_types::{ValidationReport, ValidationResult};
use tracing::{debug, info, warn};

/// Prefix shared by every issue the reconciler manages. Correlation is by
/// exact title, so changing this orphans previously created issues.
pub const ISSUE_PREFIX: &str = "[Automatic validation]";

const GENERIC_NOTICE: &str = "\
This issue was created, and will be closed and reopened, by automated \
repository validation. When the underlying problem is fixed the next \
validation run closes this issue on its own.

DO NOT change the title of this issue. The title is how the automation \
recognizes issues it owns.";

/// Reporting knobs. The defaults match what the automation has always
/// written, which matters because correlation is title-based.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub prefix: String,
    pub generic_notice: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            prefix: ISSUE_PREFIX.to_string(),
            generic_notice: GENERIC_NOTICE.to_string(),
        }
    }
}

/// What one reconciliation pass did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub created: usize,
    pub reopened: usize,
    pub closed: usize,
    pub failures: Vec<ReconcileFailure>,
}

impl ReportSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, step: StepCounts) {
        self.created += step.created;
        self.reopened += step.reopened;
        self.closed += step.closed;
    }
}

/// One rule/repository pair the reconciler could not bring up to date.
#[derive(Debug, PartialEq, Eq)]
pub struct ReconcileFailure {
    pub repository: String,
    pub rule_name: String,
    pub error: String,
}

#[derive(Debug, Default)]
struct StepCounts {
    created: usize,
    reopened: usize,
    closed: usize,
}

/// Drives host issues toward the state the reports describe.
///
/// The pass is idempotent: running it twice against unchanged reports
/// performs no writes the second time.
pub struct IssueReconciler {
    config: ReportConfig,
}

impl IssueReconciler {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Reconcile every result of every report. A failing result is recorded
    /// and does not stop reconciliation of the remaining results.
    pub fn report(&self, host: &dyn HostPort, reports: &[ValidationReport]) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for report in reports {
            for result in &report.results {
                match self.reconcile(host, report, result) {
                    Ok(step) => summary.absorb(step),
                    Err(error) => {
                        warn!(
                            repository = %report.full_name(),
                            rule = %result.rule_name,
                            error = %error,
                            "issue reconciliation failed"
                        );
                        summary.failures.push(ReconcileFailure {
                            repository: report.full_name(),
                            rule_name: result.rule_name.clone(),
                            error: error.to_string(),
                        });
                    }
                }
            }
        }
        info!(
            created = summary.created,
            reopened = summary.reopened,
            closed = summary.closed,
            failures = summary.failures.len(),
            "issue reconciliation finished"
        );
        summary
    }

    fn reconcile(
        &self,
        host: &dyn HostPort,
        report: &ValidationReport,
        result: &ValidationResult,
    ) -> Result<StepCounts, HostError> {
        let title = self.issue_title(&result.rule_name);
        let matches = host.issues_with_title(&report.owner, &report.repository_name, &title)?;
        let mut step = StepCounts::default();

        if result.is_valid {
            // Close every open copy, duplicates included.
            for issue in matches.iter().filter(|i| i.state == IssueState::Open) {
                host.set_issue_state(
                    &report.owner,
                    &report.repository_name,
                    issue.number,
                    IssueState::Closed,
                )?;
                step.closed += 1;
            }
        } else if matches.is_empty() {
            let created = host.create_issue(
                &report.owner,
                &report.repository_name,
                &NewIssue {
                    title,
                    body: self.issue_body(&result.how_to_fix),
                },
            )?;
            debug!(
                repository = %report.full_name(),
                number = created.number,
                "issue created"
            );
            step.created += 1;
        } else {
            // Reopen rather than create, so the history stays on one issue.
            for issue in matches.iter().filter(|i| i.state == IssueState::Closed) {
                host.set_issue_state(
                    &report.owner,
                    &report.repository_name,
                    issue.number,
                    IssueState::Open,
                )?;
                step.reopened += 1;
            }
        }
        // Invalid with only open matches: already reported, nothing to do.

        Ok(step)
    }

    fn issue_title(&self, rule_name: &str) -> String {
        format!("{} {rule_name}", self.config.prefix)
    }

    fn issue_body(&self, how_to_fix: &str) -> String {
        format!("{how_to_fix}\n\n{}", self.config.generic_notice)
    }
}

impl Default for IssueReconciler {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repovet_host::InMemoryHost;

    fn report(results: Vec<ValidationResult>) -> ValidationReport {
        ValidationReport {
            owner: "org".into(),
            repository_name: "repo".into(),
            repository_url: "https://example.invalid/org/repo".into(),
            results,
        }
    }

    fn failing(rule: &str) -> ValidationResult {
        ValidationResult::new(rule, "Add the missing file.", false)
    }

    fn passing(rule: &str) -> ValidationResult {
        ValidationResult::new(rule, "Add the missing file.", true)
    }

    #[test]
    fn empty_report_touches_nothing() {
        let host = InMemoryHost::new();
        let summary = IssueReconciler::default().report(&host, &[report(vec![])]);

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(host.total_calls(), 0);
    }

    #[test]
    fn invalid_result_without_match_creates_one_issue() {
        let host = InMemoryHost::new();
        let summary =
            IssueReconciler::default().report(&host, &[report(vec![failing("Missing License")])]);

        assert_eq!(summary.created, 1);
        assert_eq!(host.calls_to("create_issue"), 1);

        let issues = host.issues("org/repo");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "[Automatic validation] Missing License");
        assert_eq!(issues[0].state, IssueState::Open);

        let body = host.issue_body("org/repo", issues[0].number).expect("body");
        assert!(body.starts_with("Add the missing file."));
        assert!(body.ends_with(GENERIC_NOTICE));
    }

    #[test]
    fn invalid_result_with_open_match_is_a_no_op() {
        let mut host = InMemoryHost::new();
        host.seed_issue(
            "org/repo",
            "[Automatic validation] Missing License",
            IssueState::Open,
        );

        let summary =
            IssueReconciler::default().report(&host, &[report(vec![failing("Missing License")])]);

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(host.calls_to("create_issue"), 0);
        assert_eq!(host.calls_to("set_issue_state"), 0);
    }

    #[test]
    fn invalid_result_with_closed_match_reopens_it() {
        let mut host = InMemoryHost::new();
        let number = host.seed_issue(
            "org/repo",
            "[Automatic validation] Missing License",
            IssueState::Closed,
        );

        let summary =
            IssueReconciler::default().report(&host, &[report(vec![failing("Missing License")])]);

        assert_eq!(summary.reopened, 1);
        assert_eq!(host.calls_to("create_issue"), 0);
        assert_eq!(host.calls_to("set_issue_state"), 1);
        let reopened = host
            .issues("org/repo")
            .into_iter()
            .find(|i| i.number == number)
            .expect("issue");
        assert_eq!(reopened.state, IssueState::Open);
    }

    #[test]
    fn invalid_result_reopens_closed_duplicates_even_beside_an_open_one() {
        let mut host = InMemoryHost::new();
        host.seed_issue(
            "org/repo",
            "[Automatic validation] Missing License",
            IssueState::Open,
        );
        let closed = host.seed_issue(
            "org/repo",
            "[Automatic validation] Missing License",
            IssueState::Closed,
        );

        let summary =
            IssueReconciler::default().report(&host, &[report(vec![failing("Missing License")])]);

        assert_eq!(summary.created, 0);
        assert_eq!(summary.reopened, 1);
        let reopened = host
            .issues("org/repo")
            .into_iter()
            .find(|i| i.number == closed)
            .expect("issue");
        assert_eq!(reopened.state, IssueState::Open);
    }

    #[test]
    fn valid_result_closes_every_open_duplicate() {
        let mut host = InMemoryHost::new();
        for _ in 0..3 {
            host.seed_issue(
                "org/repo",
                "[Automatic validation] Missing License",
                IssueState::Open,
            );
        }

        let summary =
            IssueReconciler::default().report(&host, &[report(vec![passing("Missing License")])]);

        assert_eq!(summary.closed, 3);
        assert_eq!(host.calls_to("create_issue"), 0);
        assert_eq!(host.calls_to("set_issue_state"), 3);
        assert!(host
            .issues("org/repo")
            .iter()
            .all(|i| i.state == IssueState::Closed));
    }

    #[test]
    fn valid_result_without_match_only_searches() {
        let host = InMemoryHost::new();
        let summary =
            IssueReconciler::default().report(&host, &[report(vec![passing("Missing License")])]);

        assert_eq!(summary, ReportSummary::default());
        assert_eq!(host.total_calls(), 1);
        assert_eq!(host.calls_to("issues_with_title"), 1);
    }

    #[test]
    fn titles_correlate_per_rule_not_per_prefix() {
        let mut host = InMemoryHost::new();
        host.seed_issue(
            "org/repo",
            "[Automatic validation] Missing License",
            IssueState::Open,
        );

        let summary = IssueReconciler::default().report(
            &host,
            &[report(vec![
                failing("Missing License"),
                failing("Missing CODEOWNERS"),
            ])],
        );

        assert_eq!(summary.created, 1);
        let titles: Vec<_> = host
            .issues("org/repo")
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "[Automatic validation] Missing License",
                "[Automatic validation] Missing CODEOWNERS",
            ]
        );
    }

    #[test]
    fn second_pass_over_unchanged_reports_writes_nothing() {
        let host = InMemoryHost::new();
        let reconciler = IssueReconciler::default();
        let reports = [report(vec![
            failing("Missing License"),
            passing("Stale branches"),
        ])];

        let first = reconciler.report(&host, &reports);
        assert_eq!(first.created, 1);

        let second = reconciler.report(&host, &reports);
        assert_eq!(second, ReportSummary::default());
        assert_eq!(host.calls_to("create_issue"), 1);
        assert_eq!(host.calls_to("set_issue_state"), 0);
    }

    #[test]
    fn one_failure_does_not_block_the_rest() {
        let mut host = InMemoryHost::new();
        host.seed_issue(
            "org/repo",
            "[Automatic validation] Stale branches",
            IssueState::Open,
        );
        host.fail_on("create_issue");

        let summary = IssueReconciler::default().report(
            &host,
            &[report(vec![
                failing("Missing License"),
                passing("Stale branches"),
            ])],
        );

        assert_eq!(summary.closed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].repository, "org/repo");
        assert_eq!(summary.failures[0].rule_name, "Missing License");
    }

    #[test]
    fn custom_prefix_flows_into_titles() {
        let host = InMemoryHost::new();
        let reconciler = IssueReconciler::new(ReportConfig {
            prefix: "[bot]".into(),
            generic_notice: "managed by the bot".into(),
        });
        reconciler.report(&host, &[report(vec![failing("Missing License")])]);

        let issues = host.issues("org/repo");
        assert_eq!(issues[0].title, "[bot] Missing License");
        let body = host.issue_body("org/repo", issues[0].number).expect("body");
        assert!(body.ends_with("managed by the bot"));
    }
}
