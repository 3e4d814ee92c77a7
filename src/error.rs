// Uniform failure type for the generation pipeline

use thiserror::Error;

/// Raised on any failure of the external generation call: transport errors,
/// non-success statuses, timeouts, and empty or undecodable responses. The
/// specific cause is not distinguished to callers; [`detail`](Self::detail)
/// carries the underlying reason for logging.
#[derive(Debug, Error)]
#[error("failed to generate website code")]
pub struct GenerationError {
    detail: String,
}

impl GenerationError {
    pub(crate) fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Underlying cause, for diagnostics only.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
