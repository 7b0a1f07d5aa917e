use airmon_common::types::{SensorReading, Statistics, StatusSnapshot};
use airmon_core::buffer::SeriesBuffer;
use airmon_core::error::BufferError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// The three independently refreshed data streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Current,
    History,
    Statistics,
}

impl Stream {
    fn index(self) -> usize {
        match self {
            Stream::Current => 0,
            Stream::History => 1,
            Stream::Statistics => 2,
        }
    }
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Current => write!(f, "current"),
            Stream::History => write!(f, "history"),
            Stream::Statistics => write!(f, "statistics"),
        }
    }
}

/// Failure bookkeeping for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamHealth {
    pub consecutive_failures: u32,
    pub stale: bool,
}

/// Outcome of merging a history batch into the series buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// New readings appended to the buffer.
    pub appended: usize,
    /// Readings at or before the buffer tail, already seen in an earlier
    /// batch. Expected whenever history windows overlap.
    pub skipped: usize,
    /// Readings out of order within the batch itself.
    pub out_of_order: usize,
}

struct Inner {
    snapshot: Option<StatusSnapshot>,
    statistics: Option<Statistics>,
    buffer: SeriesBuffer,
    health: [StreamHealth; 3],
}

/// Shared state the poll tasks write and renderers read.
///
/// One mutex guards everything; every critical section is a short,
/// non-await copy or append, so writers serialize without ever blocking
/// on I/O while holding the lock. Readers always receive owned copies.
pub struct DashboardState {
    inner: Mutex<Inner>,
}

impl DashboardState {
    pub fn new(buffer: SeriesBuffer) -> Self {
        Self {
            inner: Mutex::new(Inner {
                snapshot: None,
                statistics: None,
                buffer,
                health: [StreamHealth::default(); 3],
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning only happens if a writer panicked mid-commit; the
        // state is plain data, so keep serving it.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ---- reader side ----

    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        self.lock().snapshot.clone()
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.lock().statistics.clone()
    }

    /// The full buffered series, oldest first.
    pub fn series(&self) -> Vec<SensorReading> {
        self.lock().buffer.snapshot()
    }

    /// Buffered readings newer than `now - duration`.
    pub fn series_window(&self, duration: Duration, now: DateTime<Utc>) -> Vec<SensorReading> {
        self.lock().buffer.window(duration, now)
    }

    pub fn series_len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn health(&self, stream: Stream) -> StreamHealth {
        self.lock().health[stream.index()]
    }

    pub fn is_stale(&self, stream: Stream) -> bool {
        self.health(stream).stale
    }

    // ---- writer side (poll tasks only) ----

    pub(crate) fn commit_current(
        &self,
        snapshot: StatusSnapshot,
        reading: SensorReading,
    ) -> Result<(), BufferError> {
        let mut inner = self.lock();
        inner.snapshot = Some(snapshot);
        inner.buffer.append(reading)
    }

    pub(crate) fn commit_history(&self, readings: Vec<SensorReading>) -> MergeOutcome {
        let mut inner = self.lock();
        let mut outcome = MergeOutcome::default();
        // Anything at or before the tail as of batch start was delivered
        // by an earlier overlapping window; disorder past that point is
        // the batch's own fault.
        let tail_at_start = inner.buffer.last_timestamp();
        for reading in readings {
            if let Some(tail) = tail_at_start {
                if reading.timestamp <= tail {
                    outcome.skipped += 1;
                    continue;
                }
            }
            match inner.buffer.append(reading) {
                Ok(()) => outcome.appended += 1,
                Err(BufferError::OutOfOrder { .. }) => outcome.out_of_order += 1,
            }
        }
        outcome
    }

    pub(crate) fn commit_statistics(&self, statistics: Statistics) {
        self.lock().statistics = Some(statistics);
    }

    /// Bumps the failure counter and flips the stream stale once it
    /// reaches `stale_after`. Returns the updated health.
    pub(crate) fn record_failure(&self, stream: Stream, stale_after: u32) -> StreamHealth {
        let mut inner = self.lock();
        let health = &mut inner.health[stream.index()];
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        if health.consecutive_failures >= stale_after {
            health.stale = true;
        }
        *health
    }

    /// Clears failures and staleness. Returns true when the stream was
    /// stale before this success.
    pub(crate) fn record_success(&self, stream: Stream) -> bool {
        let mut inner = self.lock();
        let health = &mut inner.health[stream.index()];
        let was_stale = health.stale;
        *health = StreamHealth::default();
        was_stale
    }
}
