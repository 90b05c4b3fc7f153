//! Metric records produced by polling checks.

use serde::{Deserialize, Serialize};

/// Kind of a metric, mirroring the type-named ingestion methods of an
/// agent sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Rate,
    Count,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Rate => "rate",
            MetricKind::Count => "count",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metric sample from one poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    /// Bare metric key; the sink receives it namespaced as
    /// `<namespace>.<check>.<name>`.
    pub name: String,

    pub value: f64,

    pub kind: MetricKind,

    /// Metric-specific tags, then the check's static tags, then the
    /// check's derived tags, in that order.
    pub tags: Vec<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64, kind: MetricKind) -> Self {
        Self { name: name.into(), value, kind, tags: Vec::new() }
    }

    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, MetricKind::Gauge)
    }

    /// Replace the tag list on an already-built metric.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_sink_methods() {
        assert_eq!(MetricKind::Gauge.as_str(), "gauge");
        assert_eq!(MetricKind::Rate.as_str(), "rate");
        assert_eq!(MetricKind::Count.as_str(), "count");
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
    }

    #[test]
    fn gauge_shorthand() {
        let metric = Metric::gauge("check", 1.0).with_tags(vec!["cluster:dev".into()]);
        assert_eq!(metric.kind, MetricKind::Gauge);
        assert_eq!(metric.tags, vec!["cluster:dev".to_string()]);
    }
}
