// Sensor reading domain model and type normalization
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Age after which the latest reading no longer counts as a live device.
pub const DEFAULT_STALENESS_MS: i64 = 300_000;

/// One historical sample of a sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub value: f64,
    pub at: DateTime<Utc>,
}

/// A sensor reading as produced by the ingestion boundary.
///
/// `sensor_type` keeps the raw upstream spelling for presentation; rule
/// lookup goes through `rule_lookup_key`, never through this field directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub location_id: String,
    pub sensor_type: String,
    pub value: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub samples: Vec<Sample>,
}

impl SensorReading {
    /// Canonical comparison key for this sensor's type.
    pub fn canonical_type(&self) -> String {
        canonical_type(&self.sensor_type)
    }

    /// Key used to look up metric rules for this sensor.
    pub fn rule_lookup_key(&self) -> String {
        rule_lookup_key(&self.sensor_type)
    }

    /// Whether the device is considered live at `now`.
    ///
    /// A sensor that never reported has no timestamp and is offline.
    pub fn is_online(&self, now: DateTime<Utc>, staleness_ms: i64) -> bool {
        match self.last_seen {
            Some(last_seen) => (now - last_seen).num_milliseconds() < staleness_ms,
            None => false,
        }
    }
}

/// Fold a raw sensor-type string into its canonical spelling.
///
/// Level sensors shipped under three names across hardware generations
/// ("electronivel_", "level_", "nivel_"); all fold into "nivel_".
pub fn canonical_type(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if let Some(rest) = lowered.strip_prefix("electronivel_") {
        return format!("nivel_{rest}");
    }
    if let Some(rest) = lowered.strip_prefix("level_") {
        return format!("nivel_{rest}");
    }
    lowered
}

/// Canonical type remapped for rule lookup.
///
/// The ch2-ch4 current sensors are the same physical class as ch1 and share
/// its rules; the remap applies to lookup only, the display type is kept.
pub fn rule_lookup_key(raw: &str) -> String {
    let canonical = canonical_type(raw);
    match canonical.as_str() {
        "corriente_ch2" | "corriente_ch3" | "corriente_ch4" => "corriente_ch1".to_string(),
        _ => canonical,
    }
}
