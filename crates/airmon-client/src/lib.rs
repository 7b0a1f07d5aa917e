//! Reqwest-backed [`DataSource`] for the air-quality backend's JSON API.
//!
//! Every endpoint wraps its payload in a `{success, ...}` envelope; this
//! client unwraps the envelopes and maps failures onto the shared
//! [`SourceError`] taxonomy: connection problems become `Transport`,
//! undecodable bodies become `Parse`, non-success HTTP statuses become
//! `Api`, and `success: false` on a read becomes `Rejected`.

#[cfg(test)]
mod tests;

use airmon_common::error::SourceError;
use airmon_common::types::{
    AlertRecord, CurrentStatus, Metric, SensorReading, Severity, Statistics,
};
use airmon_core::rules::{Ruleset, ThresholdRule};
use airmon_poll::DataSource;
use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;

/// Maximum body bytes quoted in an error message.
const MAX_ERR_BODY: usize = 200;

/// HTTP implementation of [`DataSource`].
pub struct HttpDataSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDataSource {
    /// Builds a source for `base_url` (e.g. `http://localhost:5000`) with
    /// a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Same, but with a caller-configured client (timeouts, proxies).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_body(&self, path: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERR_BODY),
            });
        }
        Ok(body)
    }

    /// Fetches the backend's configured thresholds and builds a
    /// [`Ruleset`] from them. Metrics the backend does not configure
    /// (or that readings do not carry, like PM10) are left unruled.
    ///
    /// # Errors
    ///
    /// [`SourceError::Parse`] when the payload decodes but carries
    /// misordered bounds.
    pub async fn fetch_ruleset(&self) -> Result<Ruleset, SourceError> {
        let body = self.get_body("/api/thresholds", &[]).await?;
        ruleset_from_body(&body)
    }

    /// The backend's most recent alert records, newest last.
    pub async fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, SourceError> {
        let body = self
            .get_body("/api/alerts", &[("limit", limit.to_string())])
            .await?;
        alerts_from_body(&body)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn current(&self) -> Result<CurrentStatus, SourceError> {
        let body = self.get_body("/api/current", &[]).await?;
        current_from_body(&body)
    }

    async fn history(
        &self,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<SensorReading>, SourceError> {
        // The wire parameter is whole hours; sub-hour windows round up.
        let hours = (window.num_minutes().max(0) + 59) / 60;
        let query = [
            ("hours", hours.max(1).to_string()),
            ("limit", limit.to_string()),
        ];
        let body = self.get_body("/api/history", &query).await?;
        history_from_body(&body)
    }

    async fn statistics(&self) -> Result<Statistics, SourceError> {
        let body = self.get_body("/api/stats", &[]).await?;
        statistics_from_body(&body)
    }

    async fn set_activity(&self, name: &str) -> Result<bool, SourceError> {
        let url = format!("{}/api/activity", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "activity": name }))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        activity_from_body(status.as_u16(), &body)
    }
}

fn transport(error: reqwest::Error) -> SourceError {
    SourceError::Transport(error.to_string())
}

/// Truncate to at most `max` bytes, snapping to a char boundary.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

fn parse_error(error: serde_json::Error) -> SourceError {
    SourceError::Parse(error.to_string())
}

fn rejected(message: Option<String>) -> SourceError {
    SourceError::Rejected(message.unwrap_or_else(|| "backend reported failure".to_string()))
}

// ---- wire envelopes ----

#[derive(Debug, Deserialize)]
struct CurrentEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<SensorReading>,
    #[serde(default)]
    level: Option<Severity>,
    #[serde(default)]
    alert: bool,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<SensorReading>,
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stats: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertsEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    alerts: Vec<AlertRecord>,
}

#[derive(Debug, Deserialize)]
struct Band {
    warning: f64,
    danger: f64,
}

#[derive(Debug, Deserialize)]
struct HumidityBand {
    warning_low: f64,
    warning_high: f64,
    danger_low: f64,
    danger_high: f64,
}

#[derive(Debug, Deserialize)]
struct ThresholdsPayload {
    #[serde(default)]
    pm25: Option<Band>,
    #[serde(default)]
    co: Option<Band>,
    #[serde(default)]
    co2: Option<Band>,
    #[serde(default)]
    temperature: Option<Band>,
    #[serde(default)]
    humidity: Option<HumidityBand>,
}

#[derive(Debug, Deserialize)]
struct ThresholdsEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    thresholds: Option<ThresholdsPayload>,
}

// ---- envelope -> domain ----

fn current_from_body(body: &str) -> Result<CurrentStatus, SourceError> {
    let envelope: CurrentEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    let reading = envelope
        .data
        .ok_or_else(|| SourceError::Parse("current envelope missing data".to_string()))?;
    Ok(CurrentStatus {
        reading,
        level: envelope.level.unwrap_or(Severity::Normal),
        alert: envelope.alert,
    })
}

fn history_from_body(body: &str) -> Result<Vec<SensorReading>, SourceError> {
    let envelope: HistoryEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    Ok(envelope.data)
}

fn statistics_from_body(body: &str) -> Result<Statistics, SourceError> {
    let envelope: StatsEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    // An empty backend reports `stats: {}`; treat absent the same way.
    Ok(envelope.stats.unwrap_or_default())
}

fn activity_from_body(status: u16, body: &str) -> Result<bool, SourceError> {
    match serde_json::from_str::<ActivityEnvelope>(body) {
        Ok(envelope) => {
            if !envelope.success {
                tracing::warn!(
                    message = envelope.message.as_deref().unwrap_or("-"),
                    "Activity change rejected"
                );
            }
            Ok(envelope.success)
        }
        // The backend answers rejections with a 400 envelope; anything
        // unparseable is a real protocol problem.
        Err(e) if (200..300).contains(&status) => Err(parse_error(e)),
        Err(_) => Err(SourceError::Api {
            status,
            body: truncate(body, MAX_ERR_BODY),
        }),
    }
}

fn alerts_from_body(body: &str) -> Result<Vec<AlertRecord>, SourceError> {
    let envelope: AlertsEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    Ok(envelope.alerts)
}

fn ruleset_from_body(body: &str) -> Result<Ruleset, SourceError> {
    let envelope: ThresholdsEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    let payload = envelope
        .thresholds
        .ok_or_else(|| SourceError::Parse("thresholds envelope missing payload".to_string()))?;

    let mut ruleset = Ruleset::new();
    let bands = [
        (Metric::Pm25, payload.pm25),
        (Metric::Co, payload.co),
        (Metric::Co2, payload.co2),
        (Metric::Temperature, payload.temperature),
    ];
    for (metric, band) in bands {
        if let Some(band) = band {
            let rule = ThresholdRule::high_only(band.warning, band.danger)
                .map_err(|e| SourceError::Parse(format!("invalid {metric} thresholds: {e}")))?;
            ruleset.set(metric, rule);
        }
    }
    if let Some(band) = payload.humidity {
        let rule = ThresholdRule::symmetric(
            band.danger_low,
            band.warning_low,
            band.warning_high,
            band.danger_high,
        )
        .map_err(|e| SourceError::Parse(format!("invalid humidity thresholds: {e}")))?;
        ruleset.set(Metric::Humidity, rule);
    }
    Ok(ruleset)
}
