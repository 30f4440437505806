//! Shared value types for the repovet workspace.
//!
//! # Design constraints
//! - `ValidationReport` is a transient value object: produced by the engine,
//!   consumed by the reporter and the fix driver, never persisted.
//! - The ignore config is parsed from a file owned by the *audited*
//!   repository; be tolerant of extra fields, strict about the ones we read.

pub mod ignore;
pub mod report;
pub mod result;

pub use ignore::IgnoreConfig;
pub use report::{RuleFailure, ValidationReport};
pub use result::{FixKind, ValidationResult};
