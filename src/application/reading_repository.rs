// Repository trait for reading and metric-config access
use crate::domain::metric::MetricConfig;
use crate::domain::sensor::SensorReading;
use async_trait::async_trait;

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// List all known point-of-sale IDs
    async fn list_location_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Fetch the readings of one point of sale over the given range.
    /// May fail per call; callers isolate failures per location.
    async fn fetch_readings(
        &self,
        location_id: &str,
        hours: i32,
    ) -> anyhow::Result<Vec<SensorReading>>;

    /// Fetch the configured metrics, optionally narrowed to one client
    async fn fetch_metric_configs(
        &self,
        client: Option<&str>,
    ) -> anyhow::Result<Vec<MetricConfig>>;
}
