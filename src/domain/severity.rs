// Severity domain model and inference strategies
use serde::{Deserialize, Serialize};

/// Severity of a sensor reading, ordered by risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal = 1,
    Preventivo = 2,
    Correctivo = 3,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Preventivo => "preventivo",
            Severity::Correctivo => "correctivo",
        }
    }

    /// Parse an explicit severity tag. Unknown tags read as Normal.
    pub fn from_tag(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "preventivo" => Severity::Preventivo,
            "correctivo" => Severity::Correctivo,
            _ => Severity::Normal,
        }
    }

    /// Display color used by aggregation buckets.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Normal => "#21ba45",
            Severity::Preventivo => "#fbbd08",
            Severity::Correctivo => "#db2828",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy for inferring a severity from a rule that carries no explicit tag.
///
/// Rule sources differ in what signal they carry: older metric configs only
/// have a human label, newer ones only a chart color. Which strategy is
/// authoritative is a deployment decision (see `EngineSettings::inference`).
pub trait SeverityInference: Send + Sync {
    fn infer(&self, label: &str, color: Option<&str>) -> Severity;
}

/// Infers severity from the rule label by substring vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelInference;

impl SeverityInference for LabelInference {
    fn infer(&self, label: &str, _color: Option<&str>) -> Severity {
        let label = label.to_lowercase();
        if label.contains("correctivo") || label.contains("critic") || label.contains("alarma") {
            Severity::Correctivo
        } else if label.contains("preventivo") || label.contains("warn") {
            Severity::Preventivo
        } else {
            Severity::Normal
        }
    }
}

/// Infers severity from a `#RRGGBB` rule color by channel dominance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorInference;

impl ColorInference {
    fn parse_channels(color: &str) -> Option<(u8, u8, u8)> {
        let hex = color.trim().strip_prefix('#').unwrap_or(color.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

impl SeverityInference for ColorInference {
    fn infer(&self, _label: &str, color: Option<&str>) -> Severity {
        // A channel at or above 0x80 counts as "high".
        match color.and_then(Self::parse_channels) {
            Some((r, g, b)) if r >= 0x80 && g < 0x80 && b < 0x80 => Severity::Correctivo,
            Some((r, g, b)) if r >= 0x80 && g >= 0x80 && b < 0x80 => Severity::Preventivo,
            _ => Severity::Normal,
        }
    }
}
