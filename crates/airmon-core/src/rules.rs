use crate::error::RuleError;
use airmon_common::types::{Metric, Severity};
use std::collections::BTreeMap;

/// A per-metric threshold rule mapping a value to a [`Severity`].
///
/// Comparisons are inclusive at every threshold: a value exactly at a
/// bound classifies at the higher severity, never the lower, so a sensor
/// sitting on the line cannot flap between levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdRule {
    /// Breach only when the value climbs too high (PM2.5, CO, CO2,
    /// temperature).
    HighOnly { warning_at: f64, danger_at: f64 },
    /// Breach on both the low and the high side (humidity).
    Symmetric {
        danger_low: f64,
        warning_low: f64,
        warning_high: f64,
        danger_high: f64,
    },
}

impl ThresholdRule {
    /// Builds a high-only rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidHighBounds`] unless
    /// `warning_at < danger_at`, or [`RuleError::NonFiniteBound`] if either
    /// bound is NaN/infinite.
    pub fn high_only(warning_at: f64, danger_at: f64) -> Result<Self, RuleError> {
        if !warning_at.is_finite() || !danger_at.is_finite() {
            return Err(RuleError::NonFiniteBound);
        }
        if warning_at >= danger_at {
            return Err(RuleError::InvalidHighBounds {
                warning_at,
                danger_at,
            });
        }
        Ok(Self::HighOnly {
            warning_at,
            danger_at,
        })
    }

    /// Builds a symmetric rule with low and high bands.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidSymmetricBounds`] unless the four
    /// bounds are strictly ascending, or [`RuleError::NonFiniteBound`] if
    /// any bound is NaN/infinite.
    pub fn symmetric(
        danger_low: f64,
        warning_low: f64,
        warning_high: f64,
        danger_high: f64,
    ) -> Result<Self, RuleError> {
        let bounds = [danger_low, warning_low, warning_high, danger_high];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(RuleError::NonFiniteBound);
        }
        if !(danger_low < warning_low && warning_low < warning_high && warning_high < danger_high) {
            return Err(RuleError::InvalidSymmetricBounds {
                danger_low,
                warning_low,
                warning_high,
                danger_high,
            });
        }
        Ok(Self::Symmetric {
            danger_low,
            warning_low,
            warning_high,
            danger_high,
        })
    }

    /// Classifies a value. Pure and total: defined for every `f64`,
    /// with non-finite input classifying as [`Severity::Danger`]
    /// (fail-safe; the caller logs the anomaly and drops the reading).
    pub fn classify(&self, value: f64) -> Severity {
        if !value.is_finite() {
            return Severity::Danger;
        }
        match *self {
            Self::HighOnly {
                warning_at,
                danger_at,
            } => {
                if value >= danger_at {
                    Severity::Danger
                } else if value >= warning_at {
                    Severity::Warning
                } else {
                    Severity::Normal
                }
            }
            Self::Symmetric {
                danger_low,
                warning_low,
                warning_high,
                danger_high,
            } => {
                if value <= danger_low || value >= danger_high {
                    Severity::Danger
                } else if value <= warning_low || value >= warning_high {
                    Severity::Warning
                } else {
                    Severity::Normal
                }
            }
        }
    }
}

/// The full set of rules the aggregator evaluates, keyed by metric.
///
/// Metrics without a rule classify as Normal. The default set carries the
/// kitchen deployment's thresholds: PM2.5 75/150 µg/m³, CO 35/100 ppm,
/// CO2 2000/5000 ppm, temperature 35/45 °C, humidity 20/30–80/90 %.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    rules: BTreeMap<Metric, ThresholdRule>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the rule for a metric.
    pub fn set(&mut self, metric: Metric, rule: ThresholdRule) -> &mut Self {
        self.rules.insert(metric, rule);
        self
    }

    pub fn rule(&self, metric: Metric) -> Option<&ThresholdRule> {
        self.rules.get(&metric)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classifies one value under this ruleset; unruled metrics are Normal.
    pub fn classify(&self, metric: Metric, value: f64) -> Severity {
        match self.rules.get(&metric) {
            Some(rule) => rule.classify(value),
            None => Severity::Normal,
        }
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        // Constructor args are compile-time constants in the right order,
        // so the validation can never fail here.
        let mut set = Self::new();
        if let (Ok(pm25), Ok(co), Ok(co2), Ok(temp), Ok(humidity)) = (
            ThresholdRule::high_only(75.0, 150.0),
            ThresholdRule::high_only(35.0, 100.0),
            ThresholdRule::high_only(2000.0, 5000.0),
            ThresholdRule::high_only(35.0, 45.0),
            ThresholdRule::symmetric(20.0, 30.0, 80.0, 90.0),
        ) {
            set.set(Metric::Pm25, pm25)
                .set(Metric::Co, co)
                .set(Metric::Co2, co2)
                .set(Metric::Temperature, temp)
                .set(Metric::Humidity, humidity);
        }
        set
    }
}
