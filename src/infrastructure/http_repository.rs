// Upstream HTTP repository implementation and ingestion boundary
//
// The upstream readings API grew across hardware generations and is loose
// about field names and value types. Everything it returns is mapped into
// the strict domain shapes here; the ambiguity does not leak past this file.
use crate::application::reading_repository::ReadingRepository;
use crate::domain::metric::{MetricConfig, Rule};
use crate::domain::sensor::{Sample, SensorReading};
use crate::domain::severity::Severity;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct HttpReadingRepository {
    host: String,
    token: String,
    client: reqwest::Client,
}

impl HttpReadingRepository {
    pub fn new(host: String, token: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to upstream API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body }.into());
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse upstream response")
    }
}

#[async_trait]
impl ReadingRepository for HttpReadingRepository {
    async fn list_location_ids(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/points-of-sale", self.host);
        let rows: Vec<serde_json::Value> = self.get_json(&url).await?;

        // Older deployments return bare id strings, newer ones objects.
        let ids = rows
            .iter()
            .filter_map(|row| match row {
                serde_json::Value::String(id) => Some(id.clone()),
                serde_json::Value::Object(obj) => obj
                    .get("id")
                    .or_else(|| obj.get("pos_id"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                _ => None,
            })
            .collect();
        Ok(ids)
    }

    async fn fetch_readings(&self, location_id: &str, hours: i32) -> Result<Vec<SensorReading>> {
        let url = format!(
            "{}/api/readings?pos={}&hours={}",
            self.host,
            urlencoding::encode(location_id),
            hours
        );
        tracing::debug!("fetching readings: {}", url);
        let rows: Vec<RawReading> = self.get_json(&url).await?;
        Ok(rows
            .into_iter()
            .map(|raw| map_reading(raw, location_id))
            .collect())
    }

    async fn fetch_metric_configs(&self, client: Option<&str>) -> Result<Vec<MetricConfig>> {
        let mut url = format!("{}/api/metrics", self.host);
        if let Some(client) = client {
            url.push_str(&format!("?client={}", urlencoding::encode(client)));
        }
        let rows: Vec<RawMetric> = self.get_json(&url).await?;
        Ok(rows.into_iter().map(map_metric).collect())
    }
}

// ---- raw upstream shapes -------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(alias = "sensorId")]
    sensor_id: String,
    #[serde(alias = "sensorType", alias = "type")]
    sensor_type: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(
        default,
        alias = "timestampOfLatestReading",
        alias = "lastSeen",
        alias = "timestamp"
    )]
    last_seen: Option<serde_json::Value>,
    #[serde(default, alias = "history")]
    samples: Vec<RawSample>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    value: serde_json::Value,
    #[serde(alias = "timestamp", alias = "time")]
    at: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawMetric {
    #[serde(alias = "metricId", alias = "metric_id")]
    id: String,
    #[serde(alias = "sensorType")]
    sensor_type: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Read a numeric value that may arrive as a JSON number or a string.
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a timestamp that may arrive as RFC 3339 or epoch milliseconds.
fn timestamp_value(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn map_reading(raw: RawReading, location_id: &str) -> SensorReading {
    let samples = raw
        .samples
        .iter()
        .filter_map(|s| {
            let value = numeric_value(&s.value)?;
            let at = timestamp_value(&s.at)?;
            Some(Sample { value, at })
        })
        .collect();

    SensorReading {
        sensor_id: raw.sensor_id,
        location_id: location_id.to_string(),
        sensor_type: raw.sensor_type,
        value: raw.value.as_ref().and_then(numeric_value),
        last_seen: raw.last_seen.as_ref().and_then(timestamp_value),
        samples,
    }
}

fn map_metric(raw: RawMetric) -> MetricConfig {
    MetricConfig {
        metric_id: raw.id,
        sensor_type: crate::domain::sensor::canonical_type(&raw.sensor_type),
        unit: raw.unit,
        rules: raw.rules.into_iter().map(map_rule).collect(),
    }
}

fn map_rule(raw: RawRule) -> Rule {
    let severity = raw
        .severity
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(Severity::from_tag);
    Rule {
        min: raw.min,
        max: raw.max,
        label: raw.label,
        severity,
        color: raw.color,
        message: raw.message,
    }
}
