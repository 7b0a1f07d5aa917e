use chrono::{DateTime, Utc};

/// Errors from constructing threshold rules.
///
/// # Examples
///
/// ```rust
/// use airmon_core::rules::ThresholdRule;
///
/// let err = ThresholdRule::high_only(150.0, 75.0).unwrap_err();
/// assert!(err.to_string().contains("warning_at"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// High-only rule bounds must satisfy `warning_at < danger_at`.
    #[error("Rule: warning_at ({warning_at}) must be below danger_at ({danger_at})")]
    InvalidHighBounds { warning_at: f64, danger_at: f64 },

    /// Symmetric rule bounds must be strictly ascending:
    /// danger_low < warning_low < warning_high < danger_high.
    #[error(
        "Rule: symmetric bounds must be strictly ascending \
         ({danger_low} < {warning_low} < {warning_high} < {danger_high} violated)"
    )]
    InvalidSymmetricBounds {
        danger_low: f64,
        warning_low: f64,
        warning_high: f64,
        danger_high: f64,
    },

    /// Threshold bounds themselves must be finite numbers.
    #[error("Rule: threshold bound is not a finite number")]
    NonFiniteBound,
}

/// Errors from appending to the series buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// The incoming reading's timestamp is not strictly after the newest
    /// buffered entry. The buffer never reorders; the caller decides
    /// whether the rejection is noteworthy.
    #[error("Buffer: out-of-order append (last={last}, incoming={incoming})")]
    OutOfOrder {
        last: DateTime<Utc>,
        incoming: DateTime<Utc>,
    },
}
