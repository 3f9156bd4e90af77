use serde::Deserialize;
use std::sync::Arc;

use crate::domain::sensor::DEFAULT_STALENESS_MS;
use crate::domain::severity::{ColorInference, LabelInference, SeverityInference};

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub host: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Tunables of the classification engine. All have working defaults so a
/// deployment only overrides what it needs.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    /// Age in ms after which a sensor counts as offline.
    #[serde(default = "default_staleness_ms")]
    pub staleness_ms: i64,
    /// Which severity-inference strategy is authoritative for rules that
    /// carry no explicit severity tag.
    #[serde(default)]
    pub inference: InferenceKind,
    /// Restrict metric configs to one client, when set.
    #[serde(default)]
    pub client: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            staleness_ms: default_staleness_ms(),
            inference: InferenceKind::default(),
            client: None,
        }
    }
}

fn default_staleness_ms() -> i64 {
    DEFAULT_STALENESS_MS
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InferenceKind {
    #[default]
    Label,
    Color,
}

impl InferenceKind {
    pub fn build(self) -> Arc<dyn SeverityInference> {
        match self {
            InferenceKind::Label => Arc::new(LabelInference),
            InferenceKind::Color => Arc::new(ColorInference),
        }
    }
}

pub fn load_upstream_config() -> anyhow::Result<UpstreamConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/upstream"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_engine_config() -> anyhow::Result<EngineConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/engine").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}
