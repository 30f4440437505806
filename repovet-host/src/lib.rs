//! Source-hosting port for repovet.
//!
//! All remote I/O goes through [`HostPort`] so the engine, rules, and
//! reporter can be tested against in-memory implementations. Content reads
//! return `Option` for not-found: absence is a value each caller branches
//! on, never an error to catch.

mod error;
pub mod memory;
mod models;
mod port;

pub use error::HostError;
pub use memory::InMemoryHost;
pub use models::{
    Branch, Commit, GitRef, Issue, IssueState, NewCommit, NewIssue, NewPullRequest, NewTreeEntry,
    Release, Repository,
};
pub use port::HostPort;
