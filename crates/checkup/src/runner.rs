//! Ordered execution of a check sequence against one target.

use std::time::Duration;

use tracing::debug;

use crate::check::{PollResult, PollingCheck};
use crate::sink::{self, MetricSink};
use crate::spec::CheckSpec;
use crate::transport::Transport;

/// Totals forwarded to the sink by one runner invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTotals {
    pub metrics: usize,
    pub events: usize,
}

/// Runs an ordered set of checks sharing a base URL.
///
/// Tags derived by each check are appended to the tag list used to build
/// the checks that follow it in the same invocation; propagation never
/// reaches backwards. A failing check never blocks the rest of the
/// sequence.
pub struct CheckRunner {
    namespace: String,
    base_url: String,
    timeout: Duration,
    tags: Vec<String>,
    specs: Vec<CheckSpec>,
}

impl CheckRunner {
    pub fn new(
        namespace: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        tags: Vec<String>,
        specs: Vec<CheckSpec>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            base_url: base_url.into(),
            timeout,
            tags,
            specs,
        }
    }

    /// Execute every check in declared order and forward whatever each one
    /// produced to the sink.
    pub async fn run(&self, transport: &dyn Transport, sink: &mut dyn MetricSink) -> RunTotals {
        let mut totals = RunTotals::default();
        // Fresh per invocation; grows as checks derive tags.
        let mut tags = self.tags.clone();

        for spec in &self.specs {
            let check = PollingCheck::new(
                &self.namespace,
                &self.base_url,
                self.timeout,
                tags.clone(),
                spec.clone(),
            );
            let result = check.run(transport).await;
            tags.extend(result.derived_tags.iter().cloned());
            self.forward(&result, sink, &mut totals);
        }

        totals
    }

    fn forward(&self, result: &PollResult, sink: &mut dyn MetricSink, totals: &mut RunTotals) {
        if !result.has_events() {
            debug!(check = %result.check_name, "no events from check");
        }
        for event in &result.events {
            sink.event(event);
            totals.events += 1;
        }

        if !result.has_metrics() {
            debug!(check = %result.check_name, "no metrics from check");
        }
        for metric in &result.metrics {
            let name = sink::qualified_name(&self.namespace, &result.check_name, &metric.name);
            if sink::forward_metric(sink, &name, metric) {
                totals.metrics += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricKind;
    use crate::sink::MemorySink;
    use crate::spec::MetricDef;
    use crate::transport::{FetchError, FetchResponse};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Routes requests by full URL; unknown URLs are refused.
    struct RoutedTransport {
        responses: HashMap<String, (u16, String)>,
    }

    impl RoutedTransport {
        fn new(routes: &[(&str, u16, &str)]) -> Self {
            let responses = routes
                .iter()
                .map(|(url, status, body)| (url.to_string(), (*status, body.to_string())))
                .collect();
            Self { responses }
        }
    }

    #[async_trait]
    impl Transport for RoutedTransport {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchResponse, FetchError> {
            match self.responses.get(url) {
                Some((status, body)) => {
                    Ok(FetchResponse { status: *status, body: body.clone() })
                }
                None => Err(FetchError::Connection("connection refused".into())),
            }
        }
    }

    fn sequence() -> Vec<CheckSpec> {
        vec![
            CheckSpec::new("master.state", "master/state.json").with_tag_keys(&["version"]),
            CheckSpec::new("master.stats", "master/stats.json"),
        ]
    }

    fn runner(specs: Vec<CheckSpec>) -> CheckRunner {
        CheckRunner::new(
            "mesos",
            "http://master:5050",
            Duration::from_secs(5),
            vec!["cluster:dev".into()],
            specs,
        )
    }

    #[tokio::test]
    async fn derived_tags_reach_later_checks_only() {
        let transport = RoutedTransport::new(&[
            ("http://master:5050/master/state.json", 200, r#"{"version": "1.2.0"}"#),
            ("http://master:5050/master/stats.json", 200, r#"{"uptime": 3600}"#),
        ]);
        let mut sink = MemorySink::default();

        runner(sequence()).run(&transport, &mut sink).await;

        let uptime = sink
            .metrics
            .iter()
            .find(|m| m.name == "mesos.master.stats.uptime")
            .expect("stats metric forwarded");
        assert!(uptime.tags.contains(&"version:1.2.0".to_string()));

        // The first check's own liveness metric predates derivation.
        let state_liveness = sink
            .metrics
            .iter()
            .find(|m| m.name == "mesos.master.state.check")
            .expect("state liveness forwarded");
        assert!(!state_liveness.tags.contains(&"version:1.2.0".to_string()));
    }

    #[tokio::test]
    async fn one_failing_check_does_not_block_the_rest() {
        // state.json is down; stats.json still answers.
        let transport = RoutedTransport::new(&[(
            "http://master:5050/master/stats.json",
            200,
            r#"{"uptime": 3600}"#,
        )]);
        let mut sink = MemorySink::default();

        let totals = runner(sequence()).run(&transport, &mut sink).await;

        assert_eq!(totals.events, 1);
        assert_eq!(sink.events.len(), 1);
        assert!(sink.events[0].event_type.ends_with("master.state"));
        assert!(sink.metrics.iter().any(|m| m.name == "mesos.master.stats.uptime"));
    }

    #[tokio::test]
    async fn unsupported_kinds_are_dropped_from_totals() {
        let mut definitions = crate::spec::MetricDefs::new();
        definitions.insert("latency".into(), MetricDef::of_kind(MetricKind::Histogram));
        definitions.insert("uptime".into(), MetricDef::default());

        let specs = vec![CheckSpec::new("master.stats", "master/stats.json")
            .with_metric_definitions(definitions)];

        let transport = RoutedTransport::new(&[(
            "http://master:5050/master/stats.json",
            200,
            r#"{"latency": 0.2, "uptime": 3600}"#,
        )]);
        let mut sink = MemorySink::default();

        let totals = runner(specs).run(&transport, &mut sink).await;

        // check + response_time + uptime forwarded; latency dropped.
        assert_eq!(totals.metrics, 3);
        assert!(sink.metrics.iter().any(|m| m.name == "mesos.master.stats.uptime"));
        assert!(!sink.metrics.iter().any(|m| m.name == "mesos.master.stats.latency"));
    }

    #[tokio::test]
    async fn totals_count_forwarded_records() {
        let transport = RoutedTransport::new(&[
            ("http://master:5050/master/state.json", 200, r#"{"version": "1.2.0"}"#),
            ("http://master:5050/master/stats.json", 200, r#"{"uptime": 3600}"#),
        ]);
        let mut sink = MemorySink::default();

        let totals = runner(sequence()).run(&transport, &mut sink).await;

        // Per check: liveness + response_time, plus stats' uptime gauge.
        assert_eq!(totals.metrics, 5);
        assert_eq!(totals.events, 0);
        assert_eq!(sink.metrics.len(), 5);
    }
}
