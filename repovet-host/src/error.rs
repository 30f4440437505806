use thiserror::Error;

/// Error taxonomy for remote host calls.
///
/// `NotFound` is only surfaced for lookups where the target is required to
/// exist (e.g. repository metadata, a commit by SHA). Content reads that may
/// legitimately miss return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Remote rejected the call. Includes the 422 a non-forced ref update
    /// gets when another writer moved the ref first.
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl HostError {
    pub fn not_found(what: impl Into<String>) -> Self {
        HostError::NotFound { what: what.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound { .. })
    }
}
