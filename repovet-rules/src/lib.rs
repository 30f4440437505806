//! Compliance rule catalog: what a healthy repository looks like and how to
//! remediate it.
//!
//! This crate owns *which* checks run and *what* an autofix changes. It does
//! not own remote transport; everything goes through the
//! [`HostPort`](repovet_host::HostPort) seam.

mod autofix;
mod rules;
mod version;

pub use autofix::{apply_fix, FixError, FixOutcome, FixStep};
pub use rules::{
    builtin_rules, HasCodeowners, HasLicense, HasNewestPinnedLibrary, HasNotManyStaleBranches,
    PinnedLibrary, Rule,
};
pub use version::ReleaseVersionFetcher;
