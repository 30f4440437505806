use http::StatusCode;
use repovet_host::{
    Branch, Commit, GitRef, HostError, HostPort, Issue, IssueState, NewCommit, NewIssue,
    NewPullRequest, NewTreeEntry, Release, Repository,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use ureq::{Agent, RequestBuilder};

use crate::wire::{
    BranchWire, CommitWire, ContentWire, IssueStateWire, IssueWire, NewBlobWire, NewCommitWire,
    NewRefWire, NewTreeEntryWire, NewTreeWire, ObjectShaWire, PullRequestWire, RefWire,
    ReleaseWire, RepositoryWire, UpdateRefWire,
};

pub const API_ROOT: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

/// Synchronous GitHub client behind [`HostPort`].
///
/// Non-2xx statuses are inspected here rather than raised by the transport,
/// so 404 can mean `None` where the port says absence is a value.
pub struct GithubHost {
    agent: Agent,
    token: String,
    api_root: String,
}

impl GithubHost {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_root(token, API_ROOT)
    }

    /// Point the client at a different API root, e.g. a GitHub Enterprise
    /// instance's `/api/v3`.
    pub fn with_api_root(token: impl Into<String>, api_root: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            token: token.into(),
            api_root: api_root.into().trim_end_matches('/').to_string(),
        }
    }

    fn authed<Any>(&self, req: RequestBuilder<Any>) -> RequestBuilder<Any> {
        req.header(
            http::header::AUTHORIZATION,
            format!("Bearer {}", self.token),
        )
        .header(http::header::ACCEPT, "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
    }

    fn get(&self, path: &str) -> Result<(StatusCode, String), HostError> {
        debug!(%path, "GET");
        let mut res = self
            .authed(self.agent.get(format!("{}{path}", self.api_root)))
            .call()
            .map_err(transport)?;
        let status = res.status();
        let body = res.body_mut().read_to_string().map_err(transport)?;
        Ok((status, body))
    }

    fn post<B: Serialize>(&self, path: &str, payload: &B) -> Result<(StatusCode, String), HostError> {
        debug!(%path, "POST");
        let mut res = self
            .authed(self.agent.post(format!("{}{path}", self.api_root)))
            .send_json(payload)
            .map_err(transport)?;
        let status = res.status();
        let body = res.body_mut().read_to_string().map_err(transport)?;
        Ok((status, body))
    }

    fn patch<B: Serialize>(&self, path: &str, payload: &B) -> Result<(StatusCode, String), HostError> {
        debug!(%path, "PATCH");
        let mut res = self
            .authed(self.agent.patch(format!("{}{path}", self.api_root)))
            .send_json(payload)
            .map_err(transport)?;
        let status = res.status();
        let body = res.body_mut().read_to_string().map_err(transport)?;
        Ok((status, body))
    }

    /// Exhausts a paginated listing endpoint. `path` must already carry its
    /// query separator since `page` is appended with `&`.
    fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, HostError> {
        let mut all = Vec::new();
        for page in 1.. {
            let paged = format!("{path}&per_page={PER_PAGE}&page={page}");
            let (status, body) = self.get(&paged)?;
            let mut items: Vec<T> = parse(&paged, status, body)?;
            let last = items.len() < PER_PAGE;
            all.append(&mut items);
            if last {
                break;
            }
        }
        Ok(all)
    }
}

fn transport(err: ureq::Error) -> HostError {
    HostError::Transport(err.to_string())
}

fn parse<T: DeserializeOwned>(
    path: &str,
    status: StatusCode,
    body: String,
) -> Result<T, HostError> {
    if !status.is_success() {
        return Err(remote(path, status, &body));
    }
    serde_json::from_str(&body).map_err(|e| HostError::Decode(format!("{path}: {e}")))
}

/// Like [`parse`] but folds 404 into `None`.
fn parse_optional<T: DeserializeOwned>(
    path: &str,
    status: StatusCode,
    body: String,
) -> Result<Option<T>, HostError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    parse(path, status, body).map(Some)
}

fn remote(path: &str, status: StatusCode, body: &str) -> HostError {
    // GitHub error bodies carry a "message" field; fall back to the raw
    // body when they do not.
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)))
        .unwrap_or_else(|| body.chars().take(200).collect());
    HostError::Remote {
        status: status.as_u16(),
        message: format!("{path}: {message}"),
    }
}

impl HostPort for GithubHost {
    fn repository(&self, owner: &str, name: &str) -> Result<Repository, HostError> {
        let path = format!("/repos/{owner}/{name}");
        let (status, body) = self.get(&path)?;
        if status == StatusCode::NOT_FOUND {
            return Err(HostError::not_found(format!("{owner}/{name}")));
        }
        parse::<RepositoryWire>(&path, status, body).map(Repository::from)
    }

    fn file_content(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>, HostError> {
        let url = format!("/repos/{owner}/{name}/contents/{path}?ref={reference}");
        let (status, body) = self.get(&url)?;
        match parse_optional::<ContentWire>(&url, status, body)? {
            None => Ok(None),
            Some(wire) => wire.decode().map(Some),
        }
    }

    fn branches(&self, owner: &str, name: &str) -> Result<Vec<Branch>, HostError> {
        let wires: Vec<BranchWire> =
            self.get_paged(&format!("/repos/{owner}/{name}/branches?"))?;
        Ok(wires.into_iter().map(Branch::from).collect())
    }

    fn commit(&self, owner: &str, name: &str, sha: &str) -> Result<Commit, HostError> {
        let path = format!("/repos/{owner}/{name}/commits/{sha}");
        let (status, body) = self.get(&path)?;
        if status == StatusCode::NOT_FOUND {
            return Err(HostError::not_found(format!("{owner}/{name}@{sha}")));
        }
        parse::<CommitWire>(&path, status, body).map(Commit::from)
    }

    fn latest_release(&self, owner: &str, name: &str) -> Result<Option<Release>, HostError> {
        let path = format!("/repos/{owner}/{name}/releases/latest");
        let (status, body) = self.get(&path)?;
        Ok(parse_optional::<ReleaseWire>(&path, status, body)?.map(Release::from))
    }

    fn issues_with_title(
        &self,
        owner: &str,
        name: &str,
        title: &str,
    ) -> Result<Vec<Issue>, HostError> {
        // No server-side title filter exists; list and match locally. The
        // listing also interleaves pull requests, which the wire type drops.
        let wires: Vec<IssueWire> =
            self.get_paged(&format!("/repos/{owner}/{name}/issues?state=all"))?;
        Ok(wires
            .into_iter()
            .filter_map(IssueWire::into_issue)
            .filter(|issue| issue.title == title)
            .collect())
    }

    fn create_issue(&self, owner: &str, name: &str, issue: &NewIssue) -> Result<Issue, HostError> {
        let path = format!("/repos/{owner}/{name}/issues");
        let (status, body) = self.post(&path, issue)?;
        let wire: IssueWire = parse(&path, status, body)?;
        Ok(Issue {
            number: wire.number,
            title: wire.title,
            state: wire.state,
        })
    }

    fn set_issue_state(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        state: IssueState,
    ) -> Result<(), HostError> {
        let path = format!("/repos/{owner}/{name}/issues/{number}");
        let (status, body) = self.patch(&path, &IssueStateWire { state })?;
        parse::<IssueWire>(&path, status, body).map(|_| ())
    }

    fn git_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
    ) -> Result<Option<GitRef>, HostError> {
        let path = format!("/repos/{owner}/{name}/git/ref/{reference}");
        let (status, body) = self.get(&path)?;
        Ok(parse_optional::<RefWire>(&path, status, body)?.map(GitRef::from))
    }

    fn create_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError> {
        let path = format!("/repos/{owner}/{name}/git/refs");
        let payload = NewRefWire {
            reference: format!("refs/{reference}"),
            sha,
        };
        let (status, body) = self.post(&path, &payload)?;
        parse::<RefWire>(&path, status, body).map(GitRef::from)
    }

    fn update_ref(
        &self,
        owner: &str,
        name: &str,
        reference: &str,
        sha: &str,
    ) -> Result<GitRef, HostError> {
        let path = format!("/repos/{owner}/{name}/git/refs/{reference}");
        let payload = UpdateRefWire { sha, force: false };
        let (status, body) = self.patch(&path, &payload)?;
        parse::<RefWire>(&path, status, body).map(GitRef::from)
    }

    fn create_blob(&self, owner: &str, name: &str, content: &str) -> Result<String, HostError> {
        let path = format!("/repos/{owner}/{name}/git/blobs");
        let payload = NewBlobWire {
            content,
            encoding: "utf-8",
        };
        let (status, body) = self.post(&path, &payload)?;
        parse::<ObjectShaWire>(&path, status, body).map(|o| o.sha)
    }

    fn create_tree(
        &self,
        owner: &str,
        name: &str,
        base_tree_sha: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, HostError> {
        let path = format!("/repos/{owner}/{name}/git/trees");
        let payload = NewTreeWire {
            base_tree: base_tree_sha,
            tree: entries
                .iter()
                .map(|e| NewTreeEntryWire {
                    path: &e.path,
                    mode: &e.mode,
                    kind: "blob",
                    sha: &e.blob_sha,
                })
                .collect(),
        };
        let (status, body) = self.post(&path, &payload)?;
        parse::<ObjectShaWire>(&path, status, body).map(|o| o.sha)
    }

    fn create_commit(
        &self,
        owner: &str,
        name: &str,
        commit: &NewCommit,
    ) -> Result<String, HostError> {
        let path = format!("/repos/{owner}/{name}/git/commits");
        let payload = NewCommitWire {
            message: &commit.message,
            tree: &commit.tree_sha,
            parents: &commit.parent_shas,
        };
        let (status, body) = self.post(&path, &payload)?;
        parse::<ObjectShaWire>(&path, status, body).map(|o| o.sha)
    }

    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        pr: &NewPullRequest,
    ) -> Result<u64, HostError> {
        let path = format!("/repos/{owner}/{name}/pulls");
        let (status, body) = self.post(&path, pr)?;
        parse::<PullRequestWire>(&path, status, body).map(|p| p.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn api_root_is_normalized() {
        let host = GithubHost::with_api_root("t", "https://ghe.example.com/api/v3/");
        assert_eq!(host.api_root, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn remote_errors_prefer_the_message_field() {
        let err = remote(
            "/repos/org/repo",
            StatusCode::FORBIDDEN,
            r#"{"message": "API rate limit exceeded"}"#,
        );
        match err {
            HostError::Remote { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "/repos/org/repo: API rate limit exceeded");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn remote_errors_fall_back_to_the_raw_body() {
        let err = remote("/x", StatusCode::BAD_GATEWAY, "upstream fell over");
        match err {
            HostError::Remote { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "/x: upstream fell over");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn optional_parse_folds_404_into_none() {
        let parsed: Option<ReleaseWire> =
            parse_optional("/x", StatusCode::NOT_FOUND, "{}".into()).expect("parse");
        assert!(parsed.is_none());
    }

    #[test]
    fn optional_parse_still_surfaces_other_failures() {
        let parsed: Result<Option<ReleaseWire>, _> =
            parse_optional("/x", StatusCode::INTERNAL_SERVER_ERROR, "{}".into());
        assert!(matches!(parsed, Err(HostError::Remote { status: 500, .. })));
    }
}
