//! The metric/event sink seam and kind dispatch.

use tracing::warn;

use crate::event::Event;
use crate::metric::{Metric, MetricKind};

/// Ingestion surface of the host agent: one method per supported metric
/// kind plus a single structured event call.
pub trait MetricSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]);
    fn rate(&mut self, name: &str, value: f64, tags: &[String]);
    fn count(&mut self, name: &str, value: f64, tags: &[String]);
    fn event(&mut self, event: &Event);
}

/// Compose the full metric name submitted to the sink.
pub fn qualified_name(namespace: &str, check_name: &str, metric_name: &str) -> String {
    format!("{namespace}.{check_name}.{metric_name}")
}

/// Dispatch one metric to the sink method matching its kind.
///
/// Returns whether the metric was accepted. Kinds outside the sink surface
/// are dropped one at a time; the rest of the batch still goes through.
pub fn forward_metric(sink: &mut dyn MetricSink, name: &str, metric: &Metric) -> bool {
    match metric.kind {
        MetricKind::Gauge => sink.gauge(name, metric.value, &metric.tags),
        MetricKind::Rate => sink.rate(name, metric.value, &metric.tags),
        MetricKind::Count => sink.count(name, metric.value, &metric.tags),
        MetricKind::Histogram => {
            warn!(metric = name, kind = %metric.kind, "metric kind not implemented by the sink, dropping");
            return false;
        }
    }
    true
}

/// One metric call recorded by [`MemorySink`].
#[derive(Debug, Clone)]
pub struct SinkMetric {
    pub method: MetricKind,
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
}

/// Sink that records every call for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub metrics: Vec<SinkMetric>,
    pub events: Vec<Event>,
}

impl MemorySink {
    fn record(&mut self, method: MetricKind, name: &str, value: f64, tags: &[String]) {
        self.metrics.push(SinkMetric {
            method,
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }
}

impl MetricSink for MemorySink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.record(MetricKind::Gauge, name, value, tags);
    }

    fn rate(&mut self, name: &str, value: f64, tags: &[String]) {
        self.record(MetricKind::Rate, name, value, tags);
    }

    fn count(&mut self, name: &str, value: f64, tags: &[String]) {
        self.record(MetricKind::Count, name, value, tags);
    }

    fn event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_routes_by_kind() {
        let mut sink = MemorySink::default();

        let accepted = forward_metric(
            &mut sink,
            "mesos.master.stats.uptime",
            &Metric::new("uptime", 42.0, MetricKind::Rate),
        );

        assert!(accepted);
        assert_eq!(sink.metrics.len(), 1);
        assert_eq!(sink.metrics[0].method, MetricKind::Rate);
        assert_eq!(sink.metrics[0].name, "mesos.master.stats.uptime");
    }

    #[test]
    fn unsupported_kind_is_dropped_without_touching_the_sink() {
        let mut sink = MemorySink::default();

        let accepted = forward_metric(
            &mut sink,
            "mesos.master.stats.latency",
            &Metric::new("latency", 0.2, MetricKind::Histogram),
        );

        assert!(!accepted);
        assert!(sink.metrics.is_empty());
    }

    #[test]
    fn qualified_names_are_namespaced() {
        assert_eq!(qualified_name("mesos", "master.state", "check"), "mesos.master.state.check");
    }
}
