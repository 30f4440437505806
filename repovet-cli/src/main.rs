mod config;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use repovet_engine::{EngineOutcome, ValidationEngine};
use repovet_github::{GithubHost, API_ROOT};
use repovet_host::HostPort;
use repovet_reporter::IssueReconciler;
use repovet_rules::{
    apply_fix, FixOutcome, HasCodeowners, HasLicense, HasNotManyStaleBranches, PinnedLibrary, Rule,
};
use repovet_types::ValidationReport;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "repovet",
    version,
    about = "Compliance auditor for hosted repositories."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate repositories and print their reports.
    Scan(ScanArgs),
    /// Validate one repository and open autofix pull requests where possible.
    Fix(FixArgs),
    /// List the rule catalog.
    Rules(RulesArgs),
}

#[derive(Debug, Args)]
struct HostArgs {
    /// API token used for every request.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// API root, e.g. a GitHub Enterprise /api/v3 endpoint.
    #[arg(long, env = "GITHUB_API_ROOT", default_value = API_ROOT)]
    api_root: String,
}

#[derive(Debug, Args)]
struct PinArgs {
    /// Library whose pinned version is audited, e.g. jenkins-ptcs-library.
    /// Without it the version rule does not run.
    #[arg(long)]
    library: Option<String>,

    /// OWNER/REPO publishing the library's releases.
    #[arg(long)]
    library_source: Option<String>,

    /// Build-pipeline file carrying the pin.
    #[arg(long, default_value = "Jenkinsfile")]
    pipeline_file: String,
}

impl PinArgs {
    fn resolve(&self) -> anyhow::Result<Option<PinnedLibrary>> {
        config::pinned_library(
            self.library.as_deref(),
            self.library_source.as_deref(),
            &self.pipeline_file,
        )
    }
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Owner of the repositories to validate.
    #[arg(long)]
    owner: String,

    /// Repository names under that owner.
    #[arg(required = true)]
    repos: Vec<String>,

    /// Run rules the repositories ignore via their own config file.
    #[arg(long, default_value_t = false)]
    override_ignore: bool,

    /// Reconcile tracker issues with the results. Without it, scan only prints.
    #[arg(long, default_value_t = false)]
    report: bool,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    host: HostArgs,

    #[command(flatten)]
    pin: PinArgs,
}

#[derive(Debug, Args)]
struct FixArgs {
    /// Owner of the repository to fix.
    #[arg(long)]
    owner: String,

    /// Repository name under that owner.
    repo: String,

    /// Run rules the repository ignores via its own config file.
    #[arg(long, default_value_t = false)]
    override_ignore: bool,

    #[command(flatten)]
    host: HostArgs,

    #[command(flatten)]
    pin: PinArgs,
}

#[derive(Debug, Args)]
struct RulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    pin: PinArgs,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Scan(args) => cmd_scan(args),
        Command::Fix(args) => cmd_fix(args),
        Command::Rules(args) => cmd_rules(args),
    }
}

fn engine_for(pin: Option<PinnedLibrary>) -> ValidationEngine {
    match pin {
        Some(pin) => ValidationEngine::new(pin),
        None => ValidationEngine::with_rules(vec![
            Box::new(HasLicense) as Box<dyn Rule>,
            Box::new(HasCodeowners),
            Box::new(HasNotManyStaleBranches),
        ]),
    }
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    let host = GithubHost::with_api_root(args.host.token, args.host.api_root);
    let mut engine = engine_for(args.pin.resolve()?);
    engine.init(&host).context("initialize rules")?;

    let mut outcomes = Vec::with_capacity(args.repos.len());
    for repo in &args.repos {
        let outcome = engine
            .validate_by_name(&host, &args.owner, repo, args.override_ignore)
            .with_context(|| format!("validate {}/{repo}", args.owner))?;
        for failure in &outcome.failures {
            warn!(
                repository = %outcome.report.full_name(),
                rule = %failure.rule_name,
                error = %failure.error,
                "rule did not complete"
            );
        }
        outcomes.push(outcome);
    }

    match args.format {
        OutputFormat::Text => print_text(&outcomes),
        OutputFormat::Json => {
            let reports: Vec<&ValidationReport> = outcomes.iter().map(|o| &o.report).collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    if args.report {
        let reports: Vec<ValidationReport> = outcomes.iter().map(|o| o.report.clone()).collect();
        let summary = IssueReconciler::default().report(&host, &reports);
        info!(
            created = summary.created,
            reopened = summary.reopened,
            closed = summary.closed,
            "issues reconciled"
        );
        if !summary.is_clean() {
            anyhow::bail!(
                "issue reconciliation failed for {} result(s)",
                summary.failures.len()
            );
        }
    }

    let incomplete: usize = outcomes.iter().map(|o| o.failures.len()).sum();
    if incomplete > 0 {
        anyhow::bail!("{incomplete} rule evaluation(s) did not complete");
    }
    Ok(())
}

fn cmd_fix(args: FixArgs) -> anyhow::Result<()> {
    let pin = args
        .pin
        .resolve()?
        .context("fix needs --library and --library-source")?;
    let host = GithubHost::with_api_root(args.host.token, args.host.api_root);
    let mut engine = ValidationEngine::new(pin);
    engine.init(&host).context("initialize rules")?;

    let repo = host
        .repository(&args.owner, &args.repo)
        .with_context(|| format!("fetch {}/{}", args.owner, args.repo))?;
    let outcome = engine
        .validate(&host, &repo, args.override_ignore)
        .with_context(|| format!("validate {}", repo.full_name()))?;

    let mut failed = 0usize;
    for result in outcome
        .report
        .results
        .iter()
        .filter(|r| !r.is_valid && !r.fix.is_none())
    {
        match apply_fix(&host, &repo, &result.fix) {
            Ok(FixOutcome::Applied {
                pull_request,
                branch,
            }) => {
                println!(
                    "{}: opened pull request #{pull_request} from {branch}",
                    result.rule_name
                );
            }
            Ok(FixOutcome::Skipped { reason }) => {
                println!("{}: skipped ({reason})", result.rule_name);
            }
            Err(e) => {
                error!(rule = %result.rule_name, error = %e, "autofix failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} autofix attempt(s) failed");
    }
    Ok(())
}

fn cmd_rules(args: RulesArgs) -> anyhow::Result<()> {
    let engine = engine_for(args.pin.resolve()?);
    match args.format {
        OutputFormat::Text => {
            for name in engine.rule_names() {
                println!("{name}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&engine.rule_names())?);
        }
    }
    Ok(())
}

fn print_text(outcomes: &[EngineOutcome]) {
    for outcome in outcomes {
        println!("{}", outcome.report.full_name());
        for result in &outcome.report.results {
            let status = if result.is_valid { "pass" } else { "FAIL" };
            println!("  {status}  {}", result.rule_name);
            if !result.is_valid {
                println!("        {}", result.how_to_fix);
            }
        }
        for failure in &outcome.failures {
            println!("  error {}: {}", failure.rule_name, failure.error);
        }
        println!();
    }
}
