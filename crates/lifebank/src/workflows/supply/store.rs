//! Storage error taxonomy shared by every repository seam.
//!
//! Records carry a `version` counter; `update` calls are compare-and-swap
//! against the version the caller read, so two staff members editing the same
//! entity resolve to one winner and one `StaleVersion` loser.

/// Failure modes a repository may surface.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(String),
    #[error("record {0} not found")]
    NotFound(String),
    #[error("record {id} changed concurrently (version {expected} is stale)")]
    StaleVersion { id: String, expected: u64 },
    #[error("conflicting reservation: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Only infrastructure hiccups qualify for automatic retry; validation and
    /// concurrency losses never do.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Run a storage call, retrying once when the backend reports a transient
/// outage. Everything else surfaces to the caller untouched.
pub(crate) fn with_retry<T>(
    mut op: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    match op() {
        Err(err) if err.is_transient() => {
            tracing::warn!(error = %err, "storage call failed, retrying once");
            op()
        }
        other => other,
    }
}
