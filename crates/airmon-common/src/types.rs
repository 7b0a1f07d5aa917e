use crate::error::ReadingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sensor channel reported by the air-quality backend.
///
/// The lowercase serde spelling matches the JSON field names on the wire
/// (`pm25`, `co`, `co2`, `temperature`, `humidity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Pm25,
    Co,
    Co2,
    Temperature,
    Humidity,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 5] = [
        Metric::Pm25,
        Metric::Co,
        Metric::Co2,
        Metric::Temperature,
        Metric::Humidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Pm25 => "pm25",
            Metric::Co => "co",
            Metric::Co2 => "co2",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pm25" => Ok(Metric::Pm25),
            "co" => Ok(Metric::Co),
            "co2" => Ok(Metric::Co2),
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            _ => Err(format!("unknown metric: {s}")),
        }
    }
}

/// Air-quality severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use airmon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Danger > Severity::Normal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Severity::Normal),
            "warning" => Ok(Severity::Warning),
            "danger" => Ok(Severity::Danger),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Timestamp codec for backend payloads.
///
/// The backend emits naive ISO-8601 timestamps (no UTC offset); accept
/// both those and proper RFC 3339, emit RFC 3339. Naive times are taken
/// as UTC.
pub mod ts_serde {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// One immutable sample from the sensor backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(with = "ts_serde")]
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub co: f64,
    pub co2: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl SensorReading {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Pm25 => self.pm25,
            Metric::Co => self.co,
            Metric::Co2 => self.co2,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    /// Checks every field for NaN/infinity, reporting the first offender.
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::NonFinite`] naming the metric and the raw
    /// value when any field is not a finite number.
    pub fn validate(&self) -> Result<(), ReadingError> {
        for metric in Metric::ALL {
            let value = self.value(metric);
            if !value.is_finite() {
                return Err(ReadingError::NonFinite { metric, value });
            }
        }
        Ok(())
    }
}

/// What the backend's current-status endpoint reports: the latest reading
/// plus the level/alert pair it computed server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStatus {
    pub reading: SensorReading,
    pub level: Severity,
    pub alert: bool,
}

/// Derived per-reading status, recomputed on every accepted reading.
///
/// Ephemeral by design: snapshots are replaced wholesale, never mutated,
/// so a renderer holding a clone can never observe a half-updated one.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub observed_at: DateTime<Utc>,
    pub per_metric: BTreeMap<Metric, Severity>,
    pub overall: Severity,
    pub alert_active: bool,
}

/// Aggregate figures for one metric over the backend's recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Backend statistics: record/alert totals plus per-metric summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub total_alerts: u64,
    #[serde(default)]
    pub pm25: Option<MetricSummary>,
    #[serde(default)]
    pub co: Option<MetricSummary>,
    #[serde(default)]
    pub co2: Option<MetricSummary>,
    #[serde(default)]
    pub temperature: Option<MetricSummary>,
    #[serde(default)]
    pub humidity: Option<MetricSummary>,
}

/// One entry from the backend's alert history: the reading that tripped
/// the alert plus the level it reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(with = "ts_serde")]
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub pm25: f64,
    pub co: f64,
    pub co2: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Statistics {
    pub fn summary(&self, metric: Metric) -> Option<&MetricSummary> {
        match metric {
            Metric::Pm25 => self.pm25.as_ref(),
            Metric::Co => self.co.as_ref(),
            Metric::Co2 => self.co2.as_ref(),
            Metric::Temperature => self.temperature.as_ref(),
            Metric::Humidity => self.humidity.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading() -> SensorReading {
        SensorReading {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            pm25: 12.5,
            co: 2.0,
            co2: 640.0,
            temperature: 24.0,
            humidity: 55.0,
        }
    }

    #[test]
    fn severity_orders_normal_below_danger() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
        assert_eq!(
            Severity::Normal.max(Severity::Danger),
            Severity::Danger
        );
    }

    #[test]
    fn severity_round_trips_through_strings() {
        for sev in [Severity::Normal, Severity::Warning, Severity::Danger] {
            let parsed: Severity = sev.to_string().parse().unwrap();
            assert_eq!(parsed, sev);
        }
        assert!("catastrophic".parse::<Severity>().is_err());
    }

    #[test]
    fn metric_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Metric::Pm25).unwrap(), "\"pm25\"");
        assert_eq!(serde_json::to_string(&Metric::Co2).unwrap(), "\"co2\"");
    }

    #[test]
    fn validate_accepts_finite_reading() {
        assert!(reading().validate().is_ok());
    }

    #[test]
    fn validate_reports_the_offending_metric() {
        let mut bad = reading();
        bad.co2 = f64::NAN;
        match bad.validate() {
            Err(ReadingError::NonFinite { metric, .. }) => {
                assert_eq!(metric, Metric::Co2);
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn reading_accepts_naive_backend_timestamps() {
        let json = r#"{
            "timestamp": "2025-06-01T12:00:00.123456",
            "pm25": 12.5, "co": 2.0, "co2": 640.0,
            "temperature": 24.0, "humidity": 55.0
        }"#;
        let parsed: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.timestamp,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn reading_accepts_rfc3339_timestamps() {
        let json = r#"{
            "timestamp": "2025-06-01T12:00:00+02:00",
            "pm25": 12.5, "co": 2.0, "co2": 640.0,
            "temperature": 24.0, "humidity": 55.0
        }"#;
        let parsed: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.timestamp,
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn statistics_defaults_when_fields_missing() {
        let stats: Statistics = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.total_records, 0);
        assert!(stats.summary(Metric::Pm25).is_none());
    }
}
