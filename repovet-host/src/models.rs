use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata as exposed by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub html_url: String,
    pub private: bool,
    /// License identifier, if the host detected one.
    pub license: Option<String>,
    pub default_branch: String,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub tip_sha: String,
}

/// A commit as read back from the host: enough for both the stale-branch
/// scan (author date) and the autofix workflow (tree identity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub tree_sha: String,
    pub author_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
}

/// A branch ref: the only mutable object in the git data model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    /// Qualified relative to `refs/`, e.g. `heads/main`.
    pub reference: String,
    pub sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTreeEntry {
    pub path: String,
    /// Git file mode, `100644` for a regular file.
    pub mode: String,
    pub blob_sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCommit {
    pub message: String,
    pub tree_sha: String,
    pub parent_shas: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    /// Head branch name (the fix branch).
    pub head: String,
    /// Base branch name (the default branch).
    pub base: String,
}
