use airmon_common::error::SourceError;
use airmon_common::types::{CurrentStatus, SensorReading, Statistics};
use async_trait::async_trait;
use chrono::Duration;

/// The remote sensor backend as the scheduler sees it.
///
/// Implementations are free to suspend on network I/O; the scheduler
/// never holds a lock across these calls. All failures surface as
/// [`SourceError`] and are absorbed at the task boundary — a failing
/// source degrades the stream to stale, it never stops the scheduler.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Latest reading plus the backend's own level/alert verdict.
    async fn current(&self) -> Result<CurrentStatus, SourceError>;

    /// Readings from the last `window`, at most `limit` of them,
    /// oldest first.
    async fn history(
        &self,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<SensorReading>, SourceError>;

    /// Record/alert totals and per-metric summaries.
    async fn statistics(&self) -> Result<Statistics, SourceError>;

    /// Fire-and-forget command switching the simulated activity.
    /// Returns the backend's success flag; never retried automatically.
    async fn set_activity(&self, name: &str) -> Result<bool, SourceError>;
}
