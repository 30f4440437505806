//! GitHub REST v3 adapter for the repovet host port.
//!
//! One synchronous client over [`ureq`]; every endpoint this crate touches
//! is mapped through the wire structs in [`wire`] before anything leaves
//! the crate, so the rest of the workspace never sees GitHub's JSON shapes.

mod client;
mod wire;

pub use client::{GithubHost, API_ROOT};
