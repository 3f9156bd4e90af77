// Dashboard service - Use case for running evaluation passes
use crate::application::reading_repository::ReadingRepository;
use crate::domain::aggregation::{connectivity_buckets, location_summary, severity_buckets};
use crate::domain::classification::classify_sensors;
use crate::domain::dashboard::Dashboard;
use crate::domain::sensor::SensorReading;
use crate::domain::severity::SeverityInference;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Orchestrates one evaluation pass: fan-out fetch per point of sale,
/// classification, aggregation, and commit of the resulting snapshot.
///
/// Passes are all-or-nothing. A pass captures a token at start; if a newer
/// pass was initiated by the time it resolves, its result is discarded
/// wholesale instead of committed.
pub struct DashboardService {
    repository: Arc<dyn ReadingRepository>,
    inference: Arc<dyn SeverityInference>,
    staleness_ms: i64,
    pass_seq: AtomicU64,
    latest: RwLock<Option<Arc<Dashboard>>>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        inference: Arc<dyn SeverityInference>,
        staleness_ms: i64,
    ) -> Self {
        Self {
            repository,
            inference,
            staleness_ms,
            pass_seq: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Run a full evaluation pass.
    ///
    /// Returns `None` when the pass was superseded before it could commit;
    /// the caller can fall back to `latest()`.
    pub async fn evaluate(
        &self,
        hours: i32,
        client: Option<&str>,
    ) -> anyhow::Result<Option<Arc<Dashboard>>> {
        let token = self.pass_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let configs = self.repository.fetch_metric_configs(client).await?;
        let location_ids = self.repository.list_location_ids().await?;
        let readings = self.fetch_all_readings(&location_ids, hours).await;

        let now = chrono::Utc::now();
        let sensors = classify_sensors(
            &readings,
            &configs,
            self.inference.as_ref(),
            now,
            self.staleness_ms,
        );
        let metrics = configs
            .iter()
            .map(|config| severity_buckets(config, &sensors))
            .collect();
        let connectivity = connectivity_buckets(&sensors);
        let summary = location_summary(&location_ids, &sensors);
        let dashboard = Arc::new(Dashboard::new(now, sensors, metrics, connectivity, summary));

        // Commit only if no newer pass was initiated meanwhile. The check
        // happens under the write lock so a superseded pass can never
        // overwrite a newer pass's committed snapshot.
        let mut latest = self.latest.write().await;
        if self.pass_seq.load(Ordering::SeqCst) != token {
            tracing::debug!("discarding superseded evaluation pass {}", token);
            return Ok(None);
        }
        *latest = Some(dashboard.clone());
        Ok(Some(dashboard))
    }

    /// Most recently committed snapshot, if any pass has completed.
    pub async fn latest(&self) -> Option<Arc<Dashboard>> {
        self.latest.read().await.clone()
    }

    /// Concurrent per-location fetch. A failed fetch is isolated to its
    /// location and contributes an empty reading list.
    async fn fetch_all_readings(&self, location_ids: &[String], hours: i32) -> Vec<SensorReading> {
        let fetches = location_ids.iter().map(|location_id| async move {
            match self.repository.fetch_readings(location_id, hours).await {
                Ok(readings) => readings,
                Err(e) => {
                    tracing::warn!("reading fetch failed for {}: {:#}", location_id, e);
                    Vec::new()
                }
            }
        });
        futures::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::{MetricConfig, Rule};
    use crate::domain::severity::{LabelInference, Severity};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::time::Duration;

    struct MockRepository {
        locations: Vec<String>,
        failing: HashSet<String>,
        configs: Vec<MetricConfig>,
        fetch_delay: Duration,
        // Fixed reporting time so repeated passes see identical readings.
        reported_at: chrono::DateTime<Utc>,
    }

    impl MockRepository {
        fn new(locations: &[&str]) -> Self {
            Self {
                locations: locations.iter().map(|s| s.to_string()).collect(),
                failing: HashSet::new(),
                configs: Vec::new(),
                fetch_delay: Duration::ZERO,
                reported_at: Utc::now(),
            }
        }

        fn failing(mut self, location_id: &str) -> Self {
            self.failing.insert(location_id.to_string());
            self
        }

        fn with_configs(mut self, configs: Vec<MetricConfig>) -> Self {
            self.configs = configs;
            self
        }

        fn with_fetch_delay(mut self, delay: Duration) -> Self {
            self.fetch_delay = delay;
            self
        }
    }

    #[async_trait]
    impl ReadingRepository for MockRepository {
        async fn list_location_ids(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.locations.clone())
        }

        async fn fetch_readings(
            &self,
            location_id: &str,
            _hours: i32,
        ) -> anyhow::Result<Vec<SensorReading>> {
            tokio::time::sleep(self.fetch_delay).await;
            if self.failing.contains(location_id) {
                anyhow::bail!("upstream unavailable for {}", location_id);
            }
            Ok(vec![SensorReading {
                sensor_id: format!("{location_id}/tds"),
                location_id: location_id.to_string(),
                sensor_type: "tds".to_string(),
                value: Some(420.0),
                last_seen: Some(self.reported_at),
                samples: Vec::new(),
            }])
        }

        async fn fetch_metric_configs(
            &self,
            _client: Option<&str>,
        ) -> anyhow::Result<Vec<MetricConfig>> {
            Ok(self.configs.clone())
        }
    }

    fn tds_config() -> MetricConfig {
        MetricConfig {
            metric_id: "tds-alto".to_string(),
            sensor_type: "tds".to_string(),
            unit: "ppm".to_string(),
            rules: vec![Rule {
                min: Some(400.0),
                max: None,
                label: String::new(),
                severity: Some(Severity::Preventivo),
                color: None,
                message: None,
            }],
        }
    }

    fn service(repository: MockRepository) -> DashboardService {
        DashboardService::new(Arc::new(repository), Arc::new(LabelInference), 300_000)
    }

    #[tokio::test]
    async fn failed_location_is_isolated() {
        let repo = MockRepository::new(&["pos-1", "pos-2", "pos-3"]).failing("pos-2");
        let service = service(repo);
        let dashboard = service.evaluate(6, None).await.unwrap().unwrap();

        let locations: Vec<&str> = dashboard
            .sensors
            .iter()
            .map(|s| s.reading.location_id.as_str())
            .collect();
        assert_eq!(locations, vec!["pos-1", "pos-3"]);
        // The failed location still appears in the summary roster, empty.
        let nivel = &dashboard.summary[0];
        assert_eq!(nivel.per_location.len(), 3);
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let repo = MockRepository::new(&["pos-1", "pos-2"]).with_configs(vec![tds_config()]);
        let service = service(repo);
        let first = service.evaluate(6, None).await.unwrap().unwrap();
        let second = service.evaluate(6, None).await.unwrap().unwrap();

        let strip_time = |d: &Dashboard| {
            let mut v = serde_json::to_value(d).unwrap();
            v.as_object_mut().unwrap().remove("generated_at");
            v
        };
        assert_eq!(strip_time(&first), strip_time(&second));
    }

    #[tokio::test]
    async fn classified_snapshot_reaches_buckets() {
        let repo = MockRepository::new(&["pos-1"]).with_configs(vec![tds_config()]);
        let service = service(repo);
        let dashboard = service.evaluate(6, None).await.unwrap().unwrap();

        assert_eq!(dashboard.metrics.len(), 1);
        let buckets = &dashboard.metrics[0].buckets;
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].severity, Severity::Preventivo);
        assert_eq!(buckets[0].count, 1);
    }

    #[tokio::test]
    async fn superseded_pass_is_discarded() {
        let repo = MockRepository::new(&["pos-1"]).with_fetch_delay(Duration::from_millis(50));
        let service = Arc::new(service(repo));

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.evaluate(6, None).await })
        };
        // Let the slow pass start, then initiate a newer one.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fast = service.evaluate(6, None).await.unwrap();
        assert!(fast.is_some());

        let slow = slow.await.unwrap().unwrap();
        assert!(slow.is_none());
        // The committed snapshot is the newer pass's, untouched by the slow one.
        let latest = service.latest().await.unwrap();
        assert_eq!(latest.generated_at, fast.unwrap().generated_at);
    }
}
