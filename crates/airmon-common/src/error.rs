use crate::types::Metric;

/// Errors a data source can surface to the polling layer.
///
/// Kept transport-agnostic so that `airmon-poll` can consume any source
/// implementation without depending on its HTTP stack. The reqwest client
/// maps its own errors into these variants.
///
/// # Examples
///
/// ```rust
/// use airmon_common::error::SourceError;
///
/// let err = SourceError::Transport("connection refused".to_string());
/// assert!(err.to_string().contains("connection refused"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or connection failure (refused, reset, timed out).
    #[error("Source: transport failure: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded.
    #[error("Source: malformed response: {0}")]
    Parse(String),

    /// The backend answered with a non-success HTTP status.
    #[error("Source: API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// The backend's envelope reported `success: false` on a read.
    #[error("Source: request rejected: {0}")]
    Rejected(String),
}

/// Validation failure for an incoming sensor reading.
#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    /// A field held NaN or infinity. The reading is dropped by callers;
    /// the classifier itself would treat the value as Danger (fail-safe).
    #[error("Reading: non-finite {metric} value ({value})")]
    NonFinite { metric: Metric, value: f64 },
}
