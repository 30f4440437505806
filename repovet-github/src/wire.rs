//! Serde shapes for the GitHub REST endpoints the adapter calls, plus the
//! conversions into the port's own models.

use base64::prelude::{Engine, BASE64_STANDARD};
use chrono::{DateTime, Utc};
use repovet_host::{Branch, Commit, GitRef, HostError, Issue, IssueState, Release, Repository};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryWire {
    pub name: String,
    pub owner: OwnerWire,
    pub html_url: String,
    pub private: bool,
    pub license: Option<LicenseWire>,
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerWire {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LicenseWire {
    pub spdx_id: Option<String>,
}

impl From<RepositoryWire> for Repository {
    fn from(wire: RepositoryWire) -> Self {
        Repository {
            owner: wire.owner.login,
            name: wire.name,
            html_url: wire.html_url,
            private: wire.private,
            // "NOASSERTION" means GitHub saw a license file it could not
            // classify, which still counts as having one.
            license: wire.license.and_then(|l| l.spdx_id),
            default_branch: wire.default_branch,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchWire {
    pub name: String,
    pub commit: BranchTipWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchTipWire {
    pub sha: String,
}

impl From<BranchWire> for Branch {
    fn from(wire: BranchWire) -> Self {
        Branch {
            name: wire.name,
            tip_sha: wire.commit.sha,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitWire {
    pub sha: String,
    pub commit: GitCommitWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitCommitWire {
    pub author: CommitAuthorWire,
    pub tree: ObjectShaWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitAuthorWire {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectShaWire {
    pub sha: String,
}

impl From<CommitWire> for Commit {
    fn from(wire: CommitWire) -> Self {
        Commit {
            sha: wire.sha,
            tree_sha: wire.commit.tree.sha,
            author_date: wire.commit.author.date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseWire {
    pub tag_name: String,
}

impl From<ReleaseWire> for Release {
    fn from(wire: ReleaseWire) -> Self {
        Release {
            tag_name: wire.tag_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentWire {
    pub content: String,
    pub encoding: String,
}

impl ContentWire {
    /// GitHub wraps base64 content at 60 columns; the newlines are not part
    /// of the payload.
    pub fn decode(&self) -> Result<String, HostError> {
        if self.encoding != "base64" {
            return Err(HostError::Decode(format!(
                "unsupported content encoding {:?}",
                self.encoding
            )));
        }
        let compact: String = self.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64_STANDARD
            .decode(compact)
            .map_err(|e| HostError::Decode(format!("invalid base64 content: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| HostError::Decode(format!("content is not valid UTF-8: {e}")))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueWire {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    /// Present when the "issue" is actually a pull request.
    pub pull_request: Option<serde_json::Value>,
}

impl IssueWire {
    pub fn into_issue(self) -> Option<Issue> {
        if self.pull_request.is_some() {
            return None;
        }
        Some(Issue {
            number: self.number,
            title: self.title,
            state: self.state,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefWire {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: ObjectShaWire,
}

impl From<RefWire> for GitRef {
    fn from(wire: RefWire) -> Self {
        GitRef {
            // The API is fully qualified; the port speaks `heads/...`.
            reference: wire
                .reference
                .strip_prefix("refs/")
                .unwrap_or(&wire.reference)
                .to_string(),
            sha: wire.object.sha,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestWire {
    pub number: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewBlobWire<'a> {
    pub content: &'a str,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTreeWire<'a> {
    pub base_tree: &'a str,
    pub tree: Vec<NewTreeEntryWire<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTreeEntryWire<'a> {
    pub path: &'a str,
    pub mode: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewCommitWire<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct NewRefWire<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRefWire<'a> {
    pub sha: &'a str,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct IssueStateWire {
    pub state: IssueState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repository_flattens_owner_and_license() {
        let wire: RepositoryWire = serde_json::from_str(
            r#"{
                "name": "repo",
                "owner": { "login": "org" },
                "html_url": "https://github.com/org/repo",
                "private": false,
                "license": { "spdx_id": "MIT" },
                "default_branch": "main"
            }"#,
        )
        .expect("parse");
        let repo = Repository::from(wire);
        assert_eq!(repo.full_name(), "org/repo");
        assert_eq!(repo.license.as_deref(), Some("MIT"));
    }

    #[test]
    fn null_license_maps_to_none() {
        let wire: RepositoryWire = serde_json::from_str(
            r#"{
                "name": "repo",
                "owner": { "login": "org" },
                "html_url": "https://github.com/org/repo",
                "private": true,
                "license": null,
                "default_branch": "master"
            }"#,
        )
        .expect("parse");
        assert_eq!(Repository::from(wire).license, None);
    }

    #[test]
    fn content_decodes_wrapped_base64() {
        let wire = ContentWire {
            // "MIT License\n" wrapped the way the contents API wraps it
            content: "TUlUIExp\nY2Vuc2UK\n".into(),
            encoding: "base64".into(),
        };
        assert_eq!(wire.decode().expect("decode"), "MIT License\n");
    }

    #[test]
    fn content_rejects_unknown_encoding() {
        let wire = ContentWire {
            content: String::new(),
            encoding: "utf-8".into(),
        };
        assert!(matches!(wire.decode(), Err(HostError::Decode(_))));
    }

    #[test]
    fn pull_requests_are_filtered_from_issue_listings() {
        let wire: IssueWire = serde_json::from_str(
            r#"{
                "number": 7,
                "title": "Bump deps",
                "state": "open",
                "pull_request": { "url": "https://api.github.com/repos/org/repo/pulls/7" }
            }"#,
        )
        .expect("parse");
        assert!(wire.into_issue().is_none());
    }

    #[test]
    fn refs_lose_the_api_prefix() {
        let wire: RefWire = serde_json::from_str(
            r#"{ "ref": "refs/heads/main", "object": { "sha": "abc123" } }"#,
        )
        .expect("parse");
        let git_ref = GitRef::from(wire);
        assert_eq!(git_ref.reference, "heads/main");
        assert_eq!(git_ref.sha, "abc123");
    }

    #[test]
    fn commit_carries_tree_and_author_date() {
        let wire: CommitWire = serde_json::from_str(
            r#"{
                "sha": "abc",
                "commit": {
                    "author": { "date": "2024-05-01T12:00:00Z" },
                    "tree": { "sha": "def" }
                }
            }"#,
        )
        .expect("parse");
        let commit = Commit::from(wire);
        assert_eq!(commit.tree_sha, "def");
        assert_eq!(commit.author_date.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }
}
