//! In-memory [`HostPort`] implementation.
//!
//! Serves the same role as an in-memory receipt source: unit tests seed it
//! with remote state and assert on the calls it records, without a network.

use crate::error::HostError;
use crate::models::{
    Branch, Commit, GitRef, Issue, IssueState, NewCommit, NewIssue, NewPullRequest, NewTreeEntry,
    Release, Repository,
};
use crate::port::HostPort;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct StoredIssue {
    issue: Issue,
    body: String,
}

/// Seedable fake host that records every port call by method name.
#[derive(Default)]
pub struct InMemoryHost {
    repos: HashMap<String, Repository>,
    // (full_name, reference, path) -> decoded content
    files: HashMap<(String, String, String), String>,
    branches: HashMap<String, Vec<Branch>>,
    commits: HashMap<String, Commit>,
    releases: HashMap<String, Release>,
    fail_on: HashSet<&'static str>,

    issues: RefCell<HashMap<String, Vec<StoredIssue>>>,
    refs: RefCell<HashMap<(String, String), String>>,
    blobs: RefCell<HashMap<String, String>>,
    trees: RefCell<HashMap<String, (String, Vec<NewTreeEntry>)>>,
    new_commits: RefCell<HashMap<String, NewCommit>>,
    pulls: RefCell<Vec<(String, NewPullRequest)>>,
    next_object: RefCell<u64>,
    next_issue: RefCell<u64>,
    calls: RefCell<Vec<&'static str>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repository(&mut self, repo: Repository) {
        self.repos.insert(repo.full_name(), repo);
    }

    pub fn add_file(&mut self, full_name: &str, reference: &str, path: &str, content: &str) {
        self.files.insert(
            (full_name.into(), reference.into(), path.into()),
            content.into(),
        );
    }

    pub fn add_branch(&mut self, full_name: &str, name: &str, tip_sha: &str) {
        self.branches
            .entry(full_name.into())
            .or_default()
            .push(Branch {
                name: name.into(),
                tip_sha: tip_sha.into(),
            });
    }

    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.insert(commit.sha.clone(), commit);
    }

    pub fn set_release(&mut self, full_name: &str, tag: &str) {
        self.releases.insert(
            full_name.into(),
            Release {
                tag_name: tag.into(),
            },
        );
    }

    pub fn set_ref(&mut self, full_name: &str, reference: &str, sha: &str) {
        self.refs
            .borrow_mut()
            .insert((full_name.into(), reference.into()), sha.into());
    }

    pub fn seed_issue(&mut self, full_name: &str, title: &str, state: IssueState) -> u64 {
        let number = self.bump_issue_number();
        self.issues
            .borrow_mut()
            .entry(full_name.into())
            .or_default()
            .push(StoredIssue {
                issue: Issue {
                    number,
                    title: title.into(),
                    state,
                },
                body: String::new(),
            });
        number
    }

    /// The named port method will fail with a synthetic remote error.
    pub fn fail_on(&mut self, method: &'static str) {
        self.fail_on.insert(method);
    }

    // ── assertion helpers ────────────────────────────────────────────────

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| **m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn issues(&self, full_name: &str) -> Vec<Issue> {
        self.issues
            .borrow()
            .get(full_name)
            .map(|v| v.iter().map(|s| s.issue.clone()).collect())
            .unwrap_or_default()
    }

    pub fn issue_body(&self, full_name: &str, number: u64) -> Option<String> {
        self.issues
            .borrow()
            .get(full_name)?
            .iter()
            .find(|s| s.issue.number == number)
            .map(|s| s.body.clone())
    }

    pub fn ref_sha(&self, full_name: &str, reference: &str) -> Option<String> {
        self.refs
            .borrow()
            .get(&(full_name.into(), reference.into()))
            .cloned()
    }

    pub fn blob_content(&self, sha: &str) -> Option<String> {
        self.blobs.borrow().get(sha).cloned()
    }

    pub fn tree(&self, sha: &str) -> Option<(String, Vec<NewTreeEntry>)> {
        self.trees
            .borrow()
            .get(sha)
            .map(|(base, entries)| (base.clone(), entries.to_vec()))
    }

    pub fn created_commit(&self, sha: &str) -> Option<NewCommit> {
        self.new_commits.borrow().get(sha).cloned()
    }

    pub fn pull_requests(&self, full_name: &str) -> Vec<NewPullRequest> {
        self.pulls
            .borrow()
            .iter()
            .filter(|(full, _)| full == full_name)
            .map(|(_, pr)| pr.clone())
            .collect()
    }

    // ── internals ────────────────────────────────────────────────────────

    fn record(&self, method: &'static str) -> Result<(), HostError> {
        self.calls.borrow_mut().push(method);
        if self.fail_on.contains(method) {
            return Err(HostError::Remote {
                status: 500,
                message: format!("injected failure in {method}"),
            });
        }
        Ok(())
    }

    fn next_sha(&self, prefix: &str) -> String {
        let mut n = self.next_object.borrow_mut();
        *n += 1;
        format!("{prefix}-{n}")
    }

    fn bump_issue_number(&self) -> u64 {
        let mut n = self.next_issue.borrow_mut();
        *n += 1;
        *n
    }

    fn full(owner: &str, name: &str) -> String {
        format!("{owner}/{name}")
    }
}

impl HostPort for InMemoryHost {
    fn repository(&self, owner: &str, name: &str) -> Result<Repository, HostError> {
        self.record("repository")?;
        self.repos
            .get(&Self::full(owner, name))
            .cloned()
            .ok_or_else(|| HostError::not_found(Self::full(owner, name)))
    }

    fn file_content(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>, HostError> {
        self.record("file_content")?;
        Ok(self
            .files
            .get(&(Self::full(owner, name), reference.into(), path.into()))
            .cloned())
    }

    fn branches(&self, owner: &str, name: &str) -> Result<Vec<Branch>, HostError> {
        self.record("branches")?;
        Ok(self
            .branches
            .get(&Self::full(owner, name))
            .cloned()
            .unwrap_or_default())
    }

    fn commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, HostError> {
        self.record("commit")?;
        self.commits
            .get(sha)
            .cloned()
            .ok_or_else(|| HostError::not_found(format!("{}@{sha}", Self::full(owner, name))))
    }

    fn latest_release(&self, owner: &str, name: &str) -> Result<Option<Release>, HostError> {
        self.record("latest_release")?;
        Ok(self.releases.get(&Self::full(owner, name)).cloned())
    }

    fn issues_with_title(
        &self,
        owner: &str,
        name: &str,
        title: &str,
    ) -> Result<Vec<Issue>, HostError> {
        self.record("issues_with_title")?;
        Ok(self
            .issues
            .borrow()
            .get(&Self::full(owner, name))
            .map(|v| {
                v.iter()
                    .filter(|s| s.issue.title == title)
                    .map(|s| s.issue.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create_issue(&self, owner: &str, name: &str, issue: &NewIssue) -> Result<Issue, HostError> {
        self.record("create_issue")?;
        let created = Issue {
            number: self.bump_issue_number(),
            title: issue.title.clone(),
            state: IssueState::Open,
        };
        self.issues
            .borrow_mut()
            .entry(Self::full(owner, name))
            .or_default()
            .push(StoredIssue {
                issue: created.clone(),
                body: issue.body.clone(),
            });
        Ok(created)
    }

    fn set_issue_state(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        state: IssueState,
    ) -> Result<(), HostError> {
        self.record("set_issue_state")?;
        let full = Self::full(owner, name);
        let mut issues = self.issues.borrow_mut();
        let stored = issues
            .get_mut(&full)
            .and_then(|v| v.iter_mut().find(|s| s.issue.number == number))
            .ok_or_else(|| HostError::not_found(format!("{full}#{number}")))?;
        stored.issue.state = state;
        Ok(())
    }

    fn git_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
    ) -> Result<Option<GitRef>, HostError> {
        self.record("git_ref")?;
        Ok(self
            .refs
            .borrow()
            .get(&(Self::full(owner, name), reference.into()))
            .map(|sha| GitRef {
                reference: reference.into(),
                sha: sha.clone(),
            }))
    }

    fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError> {
        self.record("create_ref")?;
        self.refs
            .borrow_mut()
            .insert((Self::full(owner, name), reference.into()), sha.into());
        Ok(GitRef {
            reference: reference.into(),
            sha: sha.into(),
        })
    }

    fn update_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError> {
        self.record("update_ref")?;
        let key = (Self::full(owner, name), reference.to_string());
        let mut refs = self.refs.borrow_mut();
        if !refs.contains_key(&key) {
            return Err(HostError::not_found(format!("{}/{reference}", key.0)));
        }
        refs.insert(key, sha.into());
        Ok(GitRef {
            reference: reference.into(),
            sha: sha.into(),
        })
    }

    fn create_blob(&self, owner: &str, name: &str, content: &str) -> Result<String, HostError> {
        self.record("create_blob")?;
        let _ = Self::full(owner, name);
        let sha = self.next_sha("blob");
        self.blobs.borrow_mut().insert(sha.clone(), content.into());
        Ok(sha)
    }

    fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree_sha: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, HostError> {
        self.record("create_tree")?;
        let _ = Self::full(owner, name);
        let sha = self.next_sha("tree");
        self.trees
            .borrow_mut()
            .insert(sha.clone(), (base_tree_sha.into(), entries.to_vec()));
        Ok(sha)
    }

    fn create_commit(
        &self,
        owner: &str,
        name: &str,
        commit: &NewCommit,
    ) -> Result<String, HostError> {
        self.record("create_commit")?;
        let _ = Self::full(owner, name);
        let sha = self.next_sha("commit");
        self.new_commits.borrow_mut().insert(sha.clone(), commit.clone());
        Ok(sha)
    }

    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pr: &NewPullRequest,
    ) -> Result<u64, HostError> {
        self.record("create_pull_request")?;
        let mut pulls = self.pulls.borrow_mut();
        pulls.push((Self::full(owner, name), pr.clone()));
        Ok(pulls.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_and_injects_failures() {
        let mut host = InMemoryHost::new();
        host.fail_on("branches");

        assert!(host.latest_release("o", "r").expect("release").is_none());
        assert!(host.branches("o", "r").is_err());
        assert_eq!(host.calls_to("latest_release"), 1);
        assert_eq!(host.calls_to("branches"), 1);
        assert_eq!(host.total_calls(), 2);
    }

    #[test]
    fn issue_lifecycle_is_observable() {
        let mut host = InMemoryHost::new();
        host.seed_issue("o/r", "[x] Rule", IssueState::Closed);

        let matches = host.issues_with_title("o", "r", "[x] Rule").expect("search");
        assert_eq!(matches.len(), 1);
        host.set_issue_state("o", "r", matches[0].number, IssueState::Open)
            .expect("reopen");
        assert_eq!(host.issues("o/r")[0].state, IssueState::Open);
    }

    #[test]
    fn update_ref_requires_existing_ref() {
        let host = InMemoryHost::new();
        let err = host.update_ref("o", "r", "heads/x", "abc").unwrap_err();
        assert!(err.is_not_found());
    }
}
