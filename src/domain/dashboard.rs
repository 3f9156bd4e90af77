// Dashboard domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregation::{ConnectivityBucket, GlobalMetricSummary, MetricBuckets};
use super::classification::ClassifiedSensor;

/// One committed evaluation pass, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub sensors: Vec<ClassifiedSensor>,
    pub metrics: Vec<MetricBuckets>,
    pub connectivity: Vec<ConnectivityBucket>,
    pub summary: Vec<GlobalMetricSummary>,
}

impl Dashboard {
    pub fn new(
        generated_at: DateTime<Utc>,
        sensors: Vec<ClassifiedSensor>,
        metrics: Vec<MetricBuckets>,
        connectivity: Vec<ConnectivityBucket>,
        summary: Vec<GlobalMetricSummary>,
    ) -> Self {
        Self {
            generated_at,
            sensors,
            metrics,
            connectivity,
            summary,
        }
    }
}
