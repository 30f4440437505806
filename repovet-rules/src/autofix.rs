//! Automated-fix workflow: blob → tree → commit → ref update → pull request.
//!
//! Every object before the ref update is write-once and content-addressed;
//! a failure partway leaves only orphaned objects behind, never a corrupted
//! branch. The ref update is the single mutating step, and it is not forced:
//! two concurrent fixes for the same repository conflict there instead of
//! silently overwriting each other.

use crate::rules::pinned_library::version_pattern;
use regex::NoExpand;
use repovet_host::{HostError, HostPort, NewCommit, NewPullRequest, NewTreeEntry, Repository};
use repovet_types::FixKind;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

const FIX_BRANCH_PREFIX: &str = "repovet/update-";
const FILE_MODE_BLOB: &str = "100644";

/// The step of the commit workflow that was executing when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStep {
    Branch,
    Source,
    Blob,
    Tree,
    Commit,
    RefUpdate,
    PullRequest,
}

impl fmt::Display for FixStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixStep::Branch => "branch",
            FixStep::Source => "source",
            FixStep::Blob => "blob",
            FixStep::Tree => "tree",
            FixStep::Commit => "commit",
            FixStep::RefUpdate => "ref-update",
            FixStep::PullRequest => "pull-request",
        };
        f.write_str(name)
    }
}

/// Autofix failure, naming the failing step. Objects created by earlier
/// steps stay in place; orphaned blobs, trees, and commits are harmless.
#[derive(Debug, Error)]
#[error("autofix failed at step {step}: {source}")]
pub struct FixError {
    pub step: FixStep,
    #[source]
    pub source: HostError,
}

/// Outcome of an attempted fix.
#[derive(Debug)]
pub enum FixOutcome {
    Applied { pull_request: u64, branch: String },
    Skipped { reason: String },
}

fn at<T>(step: FixStep, res: Result<T, HostError>) -> Result<T, FixError> {
    res.map_err(|source| FixError { step, source })
}

/// Run the remediation described by `fix` against `repo`.
///
/// Invoked by the caller after a failing validation; never by the engine.
pub fn apply_fix(
    host: &dyn HostPort,
    repo: &Repository,
    fix: &FixKind,
) -> Result<FixOutcome, FixError> {
    match fix {
        FixKind::None => Ok(FixOutcome::Skipped {
            reason: "no automated fix attached".into(),
        }),
        FixKind::PinnedLibraryUpdate {
            library,
            file_path,
            expected_version,
        } => pinned_library_update(host, repo, library, file_path, expected_version),
    }
}

fn pinned_library_update(
    host: &dyn HostPort,
    repo: &Repository,
    library: &str,
    file_path: &str,
    expected_version: &str,
) -> Result<FixOutcome, FixError> {
    let owner = &repo.owner;
    let name = &repo.name;
    let branch = format!("{FIX_BRANCH_PREFIX}{library}");
    let fix_reference = format!("heads/{branch}");
    let default_reference = format!("heads/{}", repo.default_branch);

    // Fix branch from the default-branch tip, reused when it already exists.
    let default_tip = at(FixStep::Branch, host.git_ref(owner, name, &default_reference))?
        .ok_or_else(|| FixError {
            step: FixStep::Branch,
            source: HostError::not_found(default_reference.clone()),
        })?;
    let fix_ref = match at(FixStep::Branch, host.git_ref(owner, name, &fix_reference))? {
        Some(existing) => {
            debug!(branch = %branch, "reusing existing fix branch");
            existing
        }
        None => at(
            FixStep::Branch,
            host.create_ref(owner, name, &fix_reference, &default_tip.sha),
        )?,
    };

    // Re-fetch the file at the exact tip we will base the commit on.
    let content = match at(
        FixStep::Source,
        host.file_content(owner, name, file_path, &fix_ref.sha),
    )? {
        Some(content) => content,
        None => {
            warn!(repository = %repo.full_name(), file = file_path, "pipeline file gone, nothing to fix");
            return Ok(FixOutcome::Skipped {
                reason: format!("{file_path} not found at the fix branch tip"),
            });
        }
    };

    let replacement = format!("'{library}@{expected_version}'");
    let rewritten = version_pattern(library)
        .replace_all(&content, NoExpand(&replacement))
        .into_owned();
    if rewritten == content {
        return Ok(FixOutcome::Skipped {
            reason: format!("{file_path} already pins {library}@{expected_version}"),
        });
    }

    let blob_sha = at(FixStep::Blob, host.create_blob(owner, name, &rewritten))?;
    debug!(sha = %blob_sha, "created blob");

    let tip = at(FixStep::Tree, host.commit(owner, name, &fix_ref.sha))?;
    let tree_sha = at(
        FixStep::Tree,
        host.create_tree(
            owner,
            name,
            &tip.tree_sha,
            &[NewTreeEntry {
                path: file_path.into(),
                mode: FILE_MODE_BLOB.into(),
                blob_sha,
            }],
        ),
    )?;

    let message = format!("Update {library} to {expected_version}");
    let commit_sha = at(
        FixStep::Commit,
        host.create_commit(
            owner,
            name,
            &NewCommit {
                message: message.clone(),
                tree_sha,
                parent_shas: vec![fix_ref.sha.clone()],
            },
        ),
    )?;

    at(
        FixStep::RefUpdate,
        host.update_ref(owner, name, &fix_reference, &commit_sha),
    )?;

    let pull_request = at(
        FixStep::PullRequest,
        host.create_pull_request(
            owner,
            name,
            &NewPullRequest {
                title: message,
                body: format!(
                    "Automated update of `{library}` to `{expected_version}`.\n\n\
                     Opened by repovet after the {file_path} pin fell behind the \
                     latest published release."
                ),
                head: branch.clone(),
                base: repo.default_branch.clone(),
            },
        ),
    )?;

    info!(
        repository = %repo.full_name(),
        pull_request,
        branch = %branch,
        "opened autofix pull request"
    );
    Ok(FixOutcome::Applied {
        pull_request,
        branch,
    })
}
