use airmon_poll::PollConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_current_interval")]
    pub current_interval_secs: u64,
    #[serde(default = "default_history_interval")]
    pub history_interval_secs: u64,
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,
    /// Time window requested from the history endpoint, in whole hours.
    #[serde(default = "default_history_window_hours")]
    pub history_window_hours: i64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Consecutive poll failures before a stream is reported stale.
    #[serde(default = "default_stale_after")]
    pub stale_after: u32,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Optional age bound on buffered readings.
    #[serde(default)]
    pub buffer_max_age_minutes: Option<i64>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// How often the status line is logged.
    #[serde(default = "default_log_interval")]
    pub log_interval_secs: u64,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_current_interval() -> u64 {
    2
}

fn default_history_interval() -> u64 {
    10
}

fn default_stats_interval() -> u64 {
    30
}

fn default_history_window_hours() -> i64 {
    1
}

fn default_history_limit() -> usize {
    50
}

fn default_stale_after() -> u32 {
    1
}

fn default_buffer_capacity() -> usize {
    1000
}

fn default_request_timeout() -> u64 {
    5
}

fn default_log_interval() -> u64 {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            current_interval_secs: default_current_interval(),
            history_interval_secs: default_history_interval(),
            stats_interval_secs: default_stats_interval(),
            history_window_hours: default_history_window_hours(),
            history_limit: default_history_limit(),
            stale_after: default_stale_after(),
            buffer_capacity: default_buffer_capacity(),
            buffer_max_age_minutes: None,
            request_timeout_secs: default_request_timeout(),
            log_interval_secs: default_log_interval(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise runs on defaults. A file
    /// that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            current_interval: Duration::from_secs(self.current_interval_secs),
            history_interval: Duration::from_secs(self.history_interval_secs),
            stats_interval: Duration::from_secs(self.stats_interval_secs),
            history_window: chrono::Duration::hours(self.history_window_hours),
            history_limit: self.history_limit,
            stale_after: self.stale_after,
        }
    }
}
