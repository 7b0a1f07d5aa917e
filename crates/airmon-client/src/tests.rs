use crate::{
    activity_from_body, alerts_from_body, current_from_body, history_from_body, ruleset_from_body,
    statistics_from_body, truncate,
};
use airmon_common::error::SourceError;
use airmon_common::types::{Metric, Severity};
use chrono::{TimeZone, Utc};

// Canned payloads in the backend's exact envelope shape.

const CURRENT_OK: &str = r#"{
    "success": true,
    "data": {
        "timestamp": "2025-06-01T12:00:00.500000",
        "pm25": 82.3, "co": 12.0, "co2": 1450.0,
        "temperature": 28.5, "humidity": 61.2
    },
    "level": "warning",
    "alert": true
}"#;

const HISTORY_OK: &str = r#"{
    "success": true,
    "data": [
        {"timestamp": "2025-06-01T11:58:00", "pm25": 10.0, "co": 1.0,
         "co2": 600.0, "temperature": 24.0, "humidity": 55.0},
        {"timestamp": "2025-06-01T11:59:00", "pm25": 11.0, "co": 1.1,
         "co2": 610.0, "temperature": 24.1, "humidity": 55.2}
    ],
    "count": 2
}"#;

const STATS_OK: &str = r#"{
    "success": true,
    "stats": {
        "pm25": {"avg": 20.5, "min": 4.0, "max": 160.0},
        "total_records": 940,
        "total_alerts": 12
    }
}"#;

const THRESHOLDS_OK: &str = r#"{
    "success": true,
    "thresholds": {
        "pm25": {"warning": 75, "danger": 150},
        "pm10": {"warning": 150, "danger": 250},
        "co": {"warning": 35, "danger": 100},
        "co2": {"warning": 2000, "danger": 5000},
        "temperature": {"warning": 35, "danger": 45},
        "humidity": {"warning_low": 30, "warning_high": 80,
                     "danger_low": 20, "danger_high": 90}
    }
}"#;

const ALERTS_OK: &str = r#"{
    "success": true,
    "alerts": [
        {"timestamp": "2025-06-01T11:40:00", "level": "danger",
         "pm25": 180.0, "co": 40.0, "co2": 2200.0,
         "temperature": 39.0, "humidity": 45.0}
    ],
    "count": 1
}"#;

#[test]
fn current_envelope_parses_reading_and_verdict() {
    let status = current_from_body(CURRENT_OK).unwrap();
    assert_eq!(status.level, Severity::Warning);
    assert!(status.alert);
    assert_eq!(status.reading.pm25, 82.3);
    assert_eq!(
        status.reading.timestamp,
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(500)
    );
}

#[test]
fn current_envelope_failure_is_rejected() {
    let body = r#"{"success": false, "message": "sensor offline"}"#;
    match current_from_body(body) {
        Err(SourceError::Rejected(message)) => assert_eq!(message, "sensor offline"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn garbage_body_is_a_parse_error() {
    assert!(matches!(
        current_from_body("<html>502 Bad Gateway</html>"),
        Err(SourceError::Parse(_))
    ));
    assert!(matches!(
        history_from_body("{\"success\": true, \"data\": 3}"),
        Err(SourceError::Parse(_))
    ));
}

#[test]
fn history_envelope_preserves_order() {
    let readings = history_from_body(HISTORY_OK).unwrap();
    assert_eq!(readings.len(), 2);
    assert!(readings[0].timestamp < readings[1].timestamp);
}

#[test]
fn stats_envelope_parses_totals_and_summaries() {
    let stats = statistics_from_body(STATS_OK).unwrap();
    assert_eq!(stats.total_records, 940);
    assert_eq!(stats.total_alerts, 12);
    let pm25 = stats.summary(Metric::Pm25).unwrap();
    assert_eq!(pm25.max, 160.0);
    assert!(stats.summary(Metric::Co).is_none());
}

#[test]
fn empty_stats_payload_defaults_to_zero() {
    let stats = statistics_from_body(r#"{"success": true, "stats": {}}"#).unwrap();
    assert_eq!(stats.total_records, 0);
    let stats = statistics_from_body(r#"{"success": true}"#).unwrap();
    assert_eq!(stats.total_alerts, 0);
}

#[test]
fn thresholds_payload_builds_the_full_ruleset() {
    let ruleset = ruleset_from_body(THRESHOLDS_OK).unwrap();
    assert_eq!(ruleset.classify(Metric::Pm25, 75.0), Severity::Warning);
    assert_eq!(ruleset.classify(Metric::Co2, 5000.0), Severity::Danger);
    assert_eq!(ruleset.classify(Metric::Humidity, 15.0), Severity::Danger);
    assert_eq!(ruleset.classify(Metric::Temperature, 30.0), Severity::Normal);
}

#[test]
fn misordered_thresholds_are_a_parse_error() {
    let body = r#"{
        "success": true,
        "thresholds": {"pm25": {"warning": 150, "danger": 75}}
    }"#;
    match ruleset_from_body(body) {
        Err(SourceError::Parse(message)) => assert!(message.contains("pm25")),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn activity_success_flag_passes_through() {
    assert!(activity_from_body(200, r#"{"success": true, "message": "ok"}"#).unwrap());
    // the backend reports invalid activities as a 400 envelope
    let accepted = activity_from_body(400, r#"{"success": false, "message": "bad"}"#).unwrap();
    assert!(!accepted);
}

#[test]
fn activity_without_envelope_maps_to_http_taxonomy() {
    assert!(matches!(
        activity_from_body(200, "not json"),
        Err(SourceError::Parse(_))
    ));
    match activity_from_body(500, "boom") {
        Err(SourceError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[test]
fn alerts_envelope_parses_records() {
    let alerts = alerts_from_body(ALERTS_OK).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Severity::Danger);
    assert_eq!(alerts[0].pm25, 180.0);
}

#[test]
fn truncate_snaps_to_char_boundaries() {
    assert_eq!(truncate("short", 200), "short");
    let long = "µ".repeat(300);
    let cut = truncate(&long, 5);
    assert!(cut.ends_with("..."));
    assert!(cut.len() <= 5 + 3);
}
