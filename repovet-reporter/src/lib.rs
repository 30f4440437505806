//! Issue reconciliation: projects validation reports onto host issues so
//! that each failing rule has exactly one open issue, and nothing else.

mod reconciler;

pub use reconciler::{IssueReconciler, ReconcileFailure, ReportConfig, ReportSummary, ISSUE_PREFIX};
