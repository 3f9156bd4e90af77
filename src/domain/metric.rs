// Metric rule domain model and severity resolution
use serde::Serialize;

use super::severity::{Severity, SeverityInference};

/// One administrator-configured threshold range.
///
/// `None` on a bound means unbounded on that side; a rule with both bounds
/// absent matches every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub label: String,
    pub severity: Option<Severity>,
    pub color: Option<String>,
    pub message: Option<String>,
}

impl Rule {
    /// Inclusive range check. Non-finite values never match.
    pub fn matches(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Severity of this rule: the explicit tag when present, otherwise
    /// whatever the configured inference strategy reads out of the rule.
    pub fn effective_severity(&self, inference: &dyn SeverityInference) -> Severity {
        match self.severity {
            Some(explicit) => explicit,
            None => inference.infer(&self.label, self.color.as_deref()),
        }
    }
}

/// Threshold rules for one sensor type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricConfig {
    pub metric_id: String,
    /// Canonical sensor type this metric governs.
    pub sensor_type: String,
    pub unit: String,
    pub rules: Vec<Rule>,
}

/// Worst severity among the rules that match `value`.
///
/// No rules, no match, or no usable value all resolve to Normal; "no data"
/// is not an alert condition.
pub fn resolve_severity(
    value: Option<f64>,
    rules: &[Rule],
    inference: &dyn SeverityInference,
) -> Severity {
    let Some(value) = value else {
        return Severity::Normal;
    };
    rules
        .iter()
        .filter(|rule| rule.matches(value))
        .map(|rule| rule.effective_severity(inference))
        .max()
        .unwrap_or(Severity::Normal)
}
