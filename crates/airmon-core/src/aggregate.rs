use crate::rules::Ruleset;
use airmon_common::types::{Metric, SensorReading, Severity, StatusSnapshot};
use std::collections::BTreeMap;

/// Evaluates one reading against a ruleset and produces the derived
/// status snapshot.
///
/// Overall severity is the maximum per-metric severity under the
/// Normal < Warning < Danger order; `alert_active` holds whenever the
/// overall level is not Normal. Deterministic: the same reading and
/// ruleset always produce the same snapshot.
pub fn aggregate(reading: &SensorReading, ruleset: &Ruleset) -> StatusSnapshot {
    let mut per_metric = BTreeMap::new();
    let mut overall = Severity::Normal;

    for metric in Metric::ALL {
        let severity = ruleset.classify(metric, reading.value(metric));
        overall = overall.max(severity);
        per_metric.insert(metric, severity);
    }

    StatusSnapshot {
        observed_at: reading.timestamp,
        per_metric,
        overall,
        alert_active: overall != Severity::Normal,
    }
}
