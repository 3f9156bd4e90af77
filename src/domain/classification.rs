// Sensor classification - per-metric severity maps and liveness
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::metric::{resolve_severity, MetricConfig};
use super::sensor::SensorReading;
use super::severity::{Severity, SeverityInference};

/// A reading with its evaluation result for one pass.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedSensor {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub severity_by_metric: HashMap<String, Severity>,
    pub worst_severity: Severity,
    pub online: bool,
}

impl ClassifiedSensor {
    pub fn severity_for(&self, metric_id: &str) -> Severity {
        self.severity_by_metric
            .get(metric_id)
            .copied()
            .unwrap_or(Severity::Normal)
    }
}

fn metric_applies(reading: &SensorReading, config: &MetricConfig) -> bool {
    // Primary: canonical lookup-key equality. Fallback: the canonicalized
    // display type contains the metric's type as a substring, which covers
    // compound type names like "tds_entrada" against a plain "tds" metric.
    reading.rule_lookup_key() == config.sensor_type
        || reading.canonical_type().contains(&config.sensor_type)
}

/// Classify every reading against every configured metric.
///
/// Every configured metric gets an entry per sensor, Normal when the metric
/// does not apply, so downstream bucket counts line up across metrics.
pub fn classify_sensors(
    readings: &[SensorReading],
    configs: &[MetricConfig],
    inference: &dyn SeverityInference,
    now: DateTime<Utc>,
    staleness_ms: i64,
) -> Vec<ClassifiedSensor> {
    readings
        .iter()
        .map(|reading| {
            let mut severity_by_metric = HashMap::with_capacity(configs.len());
            for config in configs {
                let severity = if metric_applies(reading, config) {
                    resolve_severity(reading.value, &config.rules, inference)
                } else {
                    Severity::Normal
                };
                severity_by_metric.insert(config.metric_id.clone(), severity);
            }
            let worst_severity = severity_by_metric
                .values()
                .copied()
                .max()
                .unwrap_or(Severity::Normal);
            ClassifiedSensor {
                reading: reading.clone(),
                severity_by_metric,
                worst_severity,
                online: reading.is_online(now, staleness_ms),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::Rule;
    use crate::domain::severity::LabelInference;
    use chrono::Duration;

    fn reading(sensor_type: &str, value: Option<f64>) -> SensorReading {
        SensorReading {
            sensor_id: format!("{sensor_type}-1"),
            location_id: "pos-1".to_string(),
            sensor_type: sensor_type.to_string(),
            value,
            last_seen: Some(Utc::now()),
            samples: Vec::new(),
        }
    }

    fn config(metric_id: &str, sensor_type: &str, rules: Vec<Rule>) -> MetricConfig {
        MetricConfig {
            metric_id: metric_id.to_string(),
            sensor_type: sensor_type.to_string(),
            unit: "ppm".to_string(),
            rules,
        }
    }

    fn high_rule(min: f64, severity: Severity) -> Rule {
        Rule {
            min: Some(min),
            max: None,
            label: String::new(),
            severity: Some(severity),
            color: None,
            message: None,
        }
    }

    #[test]
    fn worst_severity_is_max_over_metrics() {
        let readings = vec![reading("tds", Some(500.0))];
        let configs = vec![
            config("m1", "tds", vec![]),
            config("m2", "tds", vec![high_rule(400.0, Severity::Correctivo)]),
            config("m3", "tds", vec![high_rule(300.0, Severity::Preventivo)]),
        ];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &configs, &LabelInference, now, 300_000);
        let sensor = &classified[0];
        assert_eq!(sensor.severity_for("m1"), Severity::Normal);
        assert_eq!(sensor.severity_for("m2"), Severity::Correctivo);
        assert_eq!(sensor.severity_for("m3"), Severity::Preventivo);
        assert_eq!(sensor.worst_severity, Severity::Correctivo);
    }

    #[test]
    fn every_configured_metric_gets_an_entry() {
        let readings = vec![reading("presion", Some(2.0))];
        let configs = vec![
            config("tds-alto", "tds", vec![high_rule(400.0, Severity::Correctivo)]),
            config("presion-alta", "presion", vec![]),
        ];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &configs, &LabelInference, now, 300_000);
        assert_eq!(classified[0].severity_by_metric.len(), 2);
        assert_eq!(classified[0].severity_for("tds-alto"), Severity::Normal);
    }

    #[test]
    fn no_configs_means_empty_map_and_normal() {
        let readings = vec![reading("tds", Some(900.0))];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &[], &LabelInference, now, 300_000);
        assert!(classified[0].severity_by_metric.is_empty());
        assert_eq!(classified[0].worst_severity, Severity::Normal);
    }

    #[test]
    fn ch1_metric_governs_secondary_channels() {
        let readings = vec![reading("corriente_ch3", Some(12.0))];
        let configs = vec![config(
            "corriente-alta",
            "corriente_ch1",
            vec![high_rule(10.0, Severity::Correctivo)],
        )];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &configs, &LabelInference, now, 300_000);
        assert_eq!(classified[0].severity_for("corriente-alta"), Severity::Correctivo);
        assert_eq!(classified[0].reading.sensor_type, "corriente_ch3");
    }

    #[test]
    fn display_substring_fallback_applies_metric() {
        let readings = vec![reading("tds_entrada", Some(500.0))];
        let configs = vec![config("tds-alto", "tds", vec![high_rule(400.0, Severity::Preventivo)])];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &configs, &LabelInference, now, 300_000);
        assert_eq!(classified[0].severity_for("tds-alto"), Severity::Preventivo);
    }

    #[test]
    fn null_value_classifies_normal() {
        let readings = vec![reading("tds", None)];
        let configs = vec![config("tds-alto", "tds", vec![high_rule(0.0, Severity::Correctivo)])];
        let now = Utc::now();
        let classified = classify_sensors(&readings, &configs, &LabelInference, now, 300_000);
        assert_eq!(classified[0].worst_severity, Severity::Normal);
    }

    #[test]
    fn offline_flag_follows_staleness() {
        let now = Utc::now();
        let mut stale = reading("tds", Some(100.0));
        stale.last_seen = Some(now - Duration::minutes(10));
        let classified = classify_sensors(&[stale], &[], &LabelInference, now, 300_000);
        assert!(!classified[0].online);
    }
}
