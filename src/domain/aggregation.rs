// Aggregation - severity buckets, connectivity buckets and location summaries
use serde::Serialize;

use super::classification::ClassifiedSensor;
use super::metric::MetricConfig;
use super::sensor::canonical_type;
use super::severity::Severity;

/// One severity bucket of a metric, with its members for drill-down.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationBucket {
    pub severity: Severity,
    pub label: String,
    pub color: String,
    pub count: usize,
    pub members: Vec<ClassifiedSensor>,
}

/// Chart-ready severity breakdown of one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricBuckets {
    pub metric_id: String,
    pub unit: String,
    pub buckets: Vec<AggregationBucket>,
}

/// Online/offline breakdown across all sensors.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityBucket {
    pub online: bool,
    pub label: String,
    pub count: usize,
    pub members: Vec<ClassifiedSensor>,
}

/// How a global summary folds values across locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryAggregation {
    Mean,
    Sum,
}

/// Canonical types shown on the global dashboard cards, with how each is
/// folded across locations. Volumes add up; levels and efficiency average.
pub const GLOBAL_SUMMARY_TYPES: &[(&str, SummaryAggregation)] = &[
    ("nivel_purificada", SummaryAggregation::Mean),
    ("nivel_cruda", SummaryAggregation::Mean),
    ("flujo_produccion", SummaryAggregation::Sum),
    ("flujo_rechazo", SummaryAggregation::Sum),
    ("eficiencia", SummaryAggregation::Mean),
];

/// Latest value of one global metric at one location. `value` is absent when
/// the location has no matching sensor or the sensor has no usable data.
#[derive(Debug, Clone, Serialize)]
pub struct LocationValue {
    pub location_id: String,
    pub value: Option<f64>,
}

/// Cross-location view of one global metric.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalMetricSummary {
    pub sensor_type: String,
    pub aggregation: SummaryAggregation,
    /// Fold over the locations that have a value; absent when none do.
    pub aggregate: Option<f64>,
    pub per_location: Vec<LocationValue>,
}

/// Partition the classified sensors of one metric into severity buckets.
///
/// Only non-empty buckets are emitted, in display order normal →
/// preventivo → correctivo.
pub fn severity_buckets(config: &MetricConfig, sensors: &[ClassifiedSensor]) -> MetricBuckets {
    let buckets = [Severity::Normal, Severity::Preventivo, Severity::Correctivo]
        .into_iter()
        .filter_map(|severity| {
            let members: Vec<ClassifiedSensor> = sensors
                .iter()
                .filter(|s| s.severity_for(&config.metric_id) == severity)
                .cloned()
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(AggregationBucket {
                severity,
                label: severity.as_str().to_string(),
                color: severity.color().to_string(),
                count: members.len(),
                members,
            })
        })
        .collect();

    MetricBuckets {
        metric_id: config.metric_id.clone(),
        unit: config.unit.clone(),
        buckets,
    }
}

/// Partition all sensors into an online and an offline bucket.
pub fn connectivity_buckets(sensors: &[ClassifiedSensor]) -> Vec<ConnectivityBucket> {
    [(true, "online"), (false, "offline")]
        .into_iter()
        .map(|(online, label)| {
            let members: Vec<ClassifiedSensor> = sensors
                .iter()
                .filter(|s| s.online == online)
                .cloned()
                .collect();
            ConnectivityBucket {
                online,
                label: label.to_string(),
                count: members.len(),
                members,
            }
        })
        .collect()
}

fn fold(values: &[f64], aggregation: SummaryAggregation) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    match aggregation {
        SummaryAggregation::Sum => Some(sum),
        SummaryAggregation::Mean => Some(sum / values.len() as f64),
    }
}

/// Build the per-location summary for the global metric types.
///
/// `location_ids` is the roster of the pass, so locations without a matching
/// sensor still show up, with an absent value. Locations without a value are
/// excluded from the aggregate fold, never zero-filled.
pub fn location_summary(
    location_ids: &[String],
    sensors: &[ClassifiedSensor],
) -> Vec<GlobalMetricSummary> {
    GLOBAL_SUMMARY_TYPES
        .iter()
        .map(|&(sensor_type, aggregation)| {
            let per_location: Vec<LocationValue> = location_ids
                .iter()
                .map(|location_id| {
                    let values: Vec<f64> = sensors
                        .iter()
                        .filter(|s| {
                            s.reading.location_id == *location_id
                                && canonical_type(&s.reading.sensor_type) == sensor_type
                        })
                        .filter_map(|s| s.reading.value)
                        .filter(|v| v.is_finite())
                        .collect();
                    LocationValue {
                        location_id: location_id.clone(),
                        value: fold(&values, aggregation),
                    }
                })
                .collect();

            let present: Vec<f64> = per_location.iter().filter_map(|l| l.value).collect();
            GlobalMetricSummary {
                sensor_type: sensor_type.to_string(),
                aggregation,
                aggregate: fold(&present, aggregation),
                per_location,
            }
        })
        .collect()
}
