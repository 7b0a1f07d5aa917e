mod config;

use airmon_client::HttpDataSource;
use airmon_core::buffer::SeriesBuffer;
use airmon_core::rules::Ruleset;
use airmon_poll::{DashboardState, PollScheduler, Stream};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::interval;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("airmon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/dashboard.toml".to_string());
    let config = config::DashboardConfig::load_or_default(&config_path)?;
    tracing::info!(server = %config.server_url, "airmon-dashboard starting");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let source = Arc::new(HttpDataSource::with_client(&config.server_url, client));

    // Prefer the thresholds the backend actually enforces; a cold start
    // against an unreachable backend still gets the built-in set.
    let ruleset = match source.fetch_ruleset().await {
        Ok(rules) if !rules.is_empty() => {
            tracing::info!("Using backend-provided thresholds");
            rules
        }
        Ok(_) => {
            tracing::warn!("Backend returned no thresholds, using built-in set");
            Ruleset::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch thresholds, using built-in set");
            Ruleset::default()
        }
    };

    let mut buffer = SeriesBuffer::new(config.buffer_capacity);
    if let Some(minutes) = config.buffer_max_age_minutes {
        buffer = buffer.with_max_age(chrono::Duration::minutes(minutes));
    }
    let state = Arc::new(DashboardState::new(buffer));

    let handle = PollScheduler::new(
        source.clone(),
        state.clone(),
        ruleset,
        config.poll_config(),
    )
    .start();

    let mut render_tick = interval(Duration::from_secs(config.log_interval_secs));
    loop {
        tokio::select! {
            _ = render_tick.tick() => log_status(&state),
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Stand-in for the real renderer: one status line per interval, built
/// from the same snapshots a UI would consume.
fn log_status(state: &DashboardState) {
    let Some(snapshot) = state.snapshot() else {
        tracing::info!(
            stale = state.is_stale(Stream::Current),
            "No reading received yet"
        );
        return;
    };

    let levels: Vec<String> = snapshot
        .per_metric
        .iter()
        .map(|(metric, severity)| format!("{metric}={severity}"))
        .collect();

    tracing::info!(
        overall = %snapshot.overall,
        alert = snapshot.alert_active,
        metrics = %levels.join(" "),
        buffered = state.series_len(),
        stale_current = state.is_stale(Stream::Current),
        stale_history = state.is_stale(Stream::History),
        stale_stats = state.is_stale(Stream::Statistics),
        "Dashboard status"
    );

    if let Some(stats) = state.statistics() {
        tracing::debug!(
            total_records = stats.total_records,
            total_alerts = stats.total_alerts,
            "Backend statistics"
        );
    }
}
