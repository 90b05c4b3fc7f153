//! Declarative check specifications.
//!
//! A [`CheckSpec`] is a plain value describing one endpoint check: which
//! URL suffix to poll, which payload fields become tags, and (optionally)
//! which fields become metrics and how. Specs are defined once per check
//! variant and passed to the runner at construction.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::metric::MetricKind;

/// Converts a raw payload value into a metric value.
///
/// Transforms are the only place a field's shape changes; fields without
/// one are read as plain numbers.
pub type Transform = fn(&Value) -> Option<f64>;

/// How one payload field becomes a metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub kind: MetricKind,
    pub transform: Option<Transform>,
}

impl Default for MetricDef {
    fn default() -> Self {
        Self { kind: MetricKind::Gauge, transform: None }
    }
}

impl MetricDef {
    pub fn of_kind(kind: MetricKind) -> Self {
        Self { kind, transform: None }
    }

    /// A gauge read through the given transform.
    pub fn transformed(transform: Transform) -> Self {
        Self { kind: MetricKind::Gauge, transform: Some(transform) }
    }
}

/// Field-to-definition table; fields absent from it never become metrics.
pub type MetricDefs = BTreeMap<String, MetricDef>;

/// Declarative description of one endpoint check.
#[derive(Debug, Clone)]
pub struct CheckSpec {
    /// Check name, also the second segment of every metric name.
    pub name: String,

    /// Appended to the runner's base URL to form the target.
    pub url_suffix: String,

    /// Payload fields surfaced as `"key:value"` tags, in declared order.
    pub tag_keys: Vec<String>,

    /// Allow-list of fields to extract; `None` means every numeric field
    /// becomes a gauge.
    pub metric_definitions: Option<MetricDefs>,
}

impl CheckSpec {
    pub fn new(name: impl Into<String>, url_suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_suffix: url_suffix.into(),
            tag_keys: Vec::new(),
            metric_definitions: None,
        }
    }

    pub fn with_tag_keys(mut self, keys: &[&str]) -> Self {
        self.tag_keys = keys.iter().map(|key| key.to_string()).collect();
        self
    }

    pub fn with_metric_definitions(mut self, definitions: MetricDefs) -> Self {
        self.metric_definitions = Some(definitions);
        self
    }
}

/// Named transforms usable in metric definitions.
pub mod transforms {
    use serde_json::Value;

    /// Collapse an array field to its element count.
    pub fn length(value: &Value) -> Option<f64> {
        value.as_array().map(|items| items.len() as f64)
    }
}
