use crate::source::DataSource;
use crate::state::{DashboardState, Stream};
use airmon_common::error::SourceError;
use airmon_core::aggregate;
use airmon_core::error::BufferError;
use airmon_core::rules::Ruleset;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Cadences and limits for the three refresh tasks.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub current_interval: Duration,
    pub history_interval: Duration,
    pub stats_interval: Duration,
    /// Time window requested from the history endpoint.
    pub history_window: chrono::Duration,
    /// Maximum readings per history request.
    pub history_limit: usize,
    /// Consecutive failures before a stream is marked stale.
    pub stale_after: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            current_interval: Duration::from_secs(2),
            history_interval: Duration::from_secs(10),
            stats_interval: Duration::from_secs(30),
            history_window: chrono::Duration::hours(1),
            history_limit: 50,
            stale_after: 1,
        }
    }
}

/// Drives the three refresh tasks against a [`DataSource`].
///
/// Each task runs on its own timer inside its own tokio task, so a slow
/// history call can never delay the current-status cadence. The
/// current-status task fires once at start (the dashboard is warm before
/// the first interval elapses); history and statistics fire after their
/// first full interval, matching how the web dashboard staggered its
/// polling.
pub struct PollScheduler {
    source: Arc<dyn DataSource>,
    state: Arc<DashboardState>,
    ruleset: Ruleset,
    config: PollConfig,
}

impl PollScheduler {
    pub fn new(
        source: Arc<dyn DataSource>,
        state: Arc<DashboardState>,
        ruleset: Ruleset,
        config: PollConfig,
    ) -> Self {
        Self {
            source,
            state,
            ruleset,
            config,
        }
    }

    /// Spawns the three tasks and hands back their stop handle.
    pub fn start(self) -> SchedulerHandle {
        let cancel = CancellationToken::new();

        tracing::info!(
            current_secs = self.config.current_interval.as_secs(),
            history_secs = self.config.history_interval.as_secs(),
            stats_secs = self.config.stats_interval.as_secs(),
            stale_after = self.config.stale_after,
            "Poll scheduler starting"
        );

        let tasks = vec![
            tokio::spawn(current_loop(
                self.source.clone(),
                self.state.clone(),
                self.ruleset.clone(),
                self.config.clone(),
                cancel.clone(),
            )),
            tokio::spawn(history_loop(
                self.source.clone(),
                self.state.clone(),
                self.config.clone(),
                cancel.clone(),
            )),
            tokio::spawn(stats_loop(
                self.source,
                self.state,
                self.config,
                cancel.clone(),
            )),
        ];

        SchedulerHandle { cancel, tasks }
    }
}

/// Stop handle for a running scheduler.
///
/// [`stop`](SchedulerHandle::stop) is synchronous and idempotent: once it
/// returns, no task issues another data-source call. A call already in
/// flight is allowed to finish, but its result is discarded.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Poll scheduler stopping");
            self.cancel.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops and waits for all three tasks to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        tracing::info!("Poll scheduler stopped");
    }
}

/// Immediate first tick, then every `period`.
fn warm_interval(period: Duration) -> Interval {
    let mut tick = interval(period);
    // A stalled tick must not burst-replay: the next scheduled tick is
    // the only retry.
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

/// First tick after one full `period`.
fn cold_interval(period: Duration) -> Interval {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}

async fn current_loop(
    source: Arc<dyn DataSource>,
    state: Arc<DashboardState>,
    ruleset: Ruleset,
    config: PollConfig,
    cancel: CancellationToken,
) {
    let mut tick = warm_interval(config.current_interval);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let result = source.current().await;
                if cancel.is_cancelled() {
                    break;
                }
                match result {
                    Ok(status) => {
                        on_success(&state, Stream::Current);
                        if let Err(e) = status.reading.validate() {
                            tracing::warn!(error = %e, "Dropping anomalous reading");
                            continue;
                        }
                        let snapshot = aggregate(&status.reading, &ruleset);
                        if snapshot.overall != status.level {
                            tracing::debug!(
                                local = %snapshot.overall,
                                server = %status.level,
                                "Local classification disagrees with server level"
                            );
                        }
                        match state.commit_current(snapshot, status.reading) {
                            Ok(()) => {}
                            Err(BufferError::OutOfOrder { last, incoming }) => {
                                // Same reading observed twice between backend
                                // updates; the snapshot is still refreshed.
                                tracing::debug!(%last, %incoming, "Reading not newer than buffer tail");
                            }
                        }
                    }
                    Err(e) => on_failure(&state, Stream::Current, &config, &e),
                }
            }
        }
    }
}

async fn history_loop(
    source: Arc<dyn DataSource>,
    state: Arc<DashboardState>,
    config: PollConfig,
    cancel: CancellationToken,
) {
    let mut tick = cold_interval(config.history_interval);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let result = source.history(config.history_window, config.history_limit).await;
                if cancel.is_cancelled() {
                    break;
                }
                match result {
                    Ok(readings) => {
                        on_success(&state, Stream::History);
                        let outcome = state.commit_history(readings);
                        if outcome.out_of_order > 0 {
                            tracing::warn!(
                                out_of_order = outcome.out_of_order,
                                "History batch contained out-of-order readings"
                            );
                        }
                        tracing::debug!(
                            appended = outcome.appended,
                            skipped = outcome.skipped,
                            buffered = state.series_len(),
                            "History merged"
                        );
                    }
                    Err(e) => on_failure(&state, Stream::History, &config, &e),
                }
            }
        }
    }
}

async fn stats_loop(
    source: Arc<dyn DataSource>,
    state: Arc<DashboardState>,
    config: PollConfig,
    cancel: CancellationToken,
) {
    let mut tick = cold_interval(config.stats_interval);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let result = source.statistics().await;
                if cancel.is_cancelled() {
                    break;
                }
                match result {
                    Ok(statistics) => {
                        on_success(&state, Stream::Statistics);
                        state.commit_statistics(statistics);
                    }
                    Err(e) => on_failure(&state, Stream::Statistics, &config, &e),
                }
            }
        }
    }
}

fn on_success(state: &DashboardState, stream: Stream) {
    if state.record_success(stream) {
        tracing::info!(%stream, "Stream recovered");
    }
}

fn on_failure(state: &DashboardState, stream: Stream, config: &PollConfig, error: &SourceError) {
    let health = state.record_failure(stream, config.stale_after);
    tracing::warn!(
        %stream,
        error = %error,
        failures = health.consecutive_failures,
        stale = health.stale,
        "Poll failed"
    );
}
