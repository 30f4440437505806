use crate::error::HostError;
use crate::models::{
    Branch, Commit, GitRef, Issue, IssueState, NewCommit, NewIssue, NewPullRequest, NewTreeEntry,
    Release, Repository,
};

/// Capability surface the core needs from a source-hosting API.
///
/// Blobs, trees, and commits are write-once and content-addressed; the only
/// mutating, non-content-addressed operation is [`update_ref`](HostPort::update_ref).
pub trait HostPort {
    fn repository(&self, owner: &str, name: &str) -> Result<Repository, HostError>;

    /// Decoded content of a single file at the given branch or ref.
    /// `Ok(None)` when the path, the ref, or the repository content tree
    /// does not exist (a freshly created repository has no tree at all).
    fn file_content(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>, HostError>;

    fn branches(&self, owner: &str, name: &str) -> Result<Vec<Branch>, HostError>;

    fn commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, HostError>;

    /// Latest published release, excluding prereleases and drafts.
    /// `Ok(None)` when the repository has no releases.
    fn latest_release(&self, owner: &str, name: &str) -> Result<Option<Release>, HostError>;

    /// Every issue (any state) whose title matches `title` exactly.
    fn issues_with_title(&self, owner: &str, name: &str, title: &str)
        -> Result<Vec<Issue>, HostError>;

    fn create_issue(&self, owner: &str, name: &str, issue: &NewIssue) -> Result<Issue, HostError>;

    fn set_issue_state(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        state: IssueState,
    ) -> Result<(), HostError>;

    /// `Ok(None)` when the ref does not exist.
    fn git_ref(&self, owner: &str, name: &str, reference: &str)
        -> Result<Option<GitRef>, HostError>;

    fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError>;

    /// Non-forced update; the host rejects it if the ref moved concurrently.
    fn update_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError>;

    /// Returns the new blob's SHA.
    fn create_blob(&self, owner: &str, name: &str, content: &str) -> Result<String, HostError>;

    /// Creates a tree based on `base_tree_sha` with `entries` replacing the
    /// matching paths. Returns the new tree's SHA.
    fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree_sha: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, HostError>;

    /// Returns the new commit's SHA.
    fn create_commit(&self, owner: &str, name: &str, commit: &NewCommit)
        -> Result<String, HostError>;

    /// Returns the new pull request's number.
    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pr: &NewPullRequest,
    ) -> Result<u64, HostError>;
}
