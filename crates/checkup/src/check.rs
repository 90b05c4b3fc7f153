//! One poll cycle against one endpoint.

use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tracing::debug;

use crate::event::{AlertLevel, Event, EventFactory};
use crate::extract;
use crate::metric::Metric;
use crate::spec::CheckSpec;
use crate::transport::{FetchError, Transport};

/// Everything one poll cycle produced. Created fresh per run and consumed
/// by the runner; never reused.
#[derive(Debug, Clone)]
pub struct PollResult {
    pub check_name: String,
    pub metrics: Vec<Metric>,
    pub events: Vec<Event>,
    /// Tags extracted from the payload, available to checks that run later
    /// in the same sequence.
    pub derived_tags: Vec<String>,
}

impl PollResult {
    fn new(check_name: String) -> Self {
        Self { check_name, metrics: Vec::new(), events: Vec::new(), derived_tags: Vec::new() }
    }

    pub fn has_metrics(&self) -> bool {
        !self.metrics.is_empty()
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// A single endpoint check: fetch, decode, extract.
///
/// Every failure mode terminates the cycle with exactly one event; the run
/// itself never fails. All state is instance-scoped and set at
/// construction.
pub struct PollingCheck {
    spec: CheckSpec,
    url: String,
    timeout: Duration,
    tags: Vec<String>,
    events: EventFactory,
}

impl PollingCheck {
    pub fn new(
        namespace: &str,
        base_url: &str,
        timeout: Duration,
        tags: Vec<String>,
        spec: CheckSpec,
    ) -> Self {
        let url = format!("{}/{}", base_url, spec.url_suffix);
        let events = EventFactory::new(namespace, &spec.name, &url);
        Self { spec, url, timeout, tags, events }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn aggregation_key(&self) -> &str {
        self.events.aggregation_key()
    }

    /// Run one poll cycle.
    pub async fn run(&self, transport: &dyn Transport) -> PollResult {
        let mut result = PollResult::new(self.spec.name.clone());

        // Keep-alive so the check is visible even when everything else
        // goes wrong.
        result.metrics.push(Metric::gauge("check", 1.0).with_tags(self.tags.clone()));

        let started = Instant::now();
        let response = match transport.get(&self.url, self.timeout).await {
            Ok(response) => response,
            Err(FetchError::Timeout) => {
                result.events.push(self.events.build(
                    "url timeout",
                    format!(
                        "[{}] timed out after {} seconds.",
                        self.url,
                        self.timeout.as_secs_f64()
                    ),
                    AlertLevel::Error,
                ));
                return result;
            }
            Err(error) => {
                debug!(url = %self.url, %error, "fetch failed");
                result.events.push(self.events.build(
                    "connection error",
                    format!("unable to connect to [{}].", self.url),
                    AlertLevel::Error,
                ));
                return result;
            }
        };

        if response.status != 200 {
            result.events.push(self.events.build(
                "invalid response code",
                format!("[ {} ] returned a status of [ {} ]", self.url, response.status),
                AlertLevel::Error,
            ));
            return result;
        }

        result.metrics.push(
            Metric::gauge("response_time", started.elapsed().as_secs_f64())
                .with_tags(self.response_time_tags()),
        );

        self.process_body(&response.body, &mut result);
        result
    }

    fn response_time_tags(&self) -> Vec<String> {
        let mut tags = vec![format!("url:http_check:{}", self.url)];
        tags.extend(self.tags.iter().cloned());
        tags
    }

    fn process_body(&self, body: &str, result: &mut PollResult) {
        let payload: Value = match serde_json::from_str(body) {
            Ok(payload) => payload,
            Err(error) => {
                debug!(url = %self.url, %error, "undecodable body");
                result.events.push(self.events.build(
                    "json parse error",
                    format!("unable to decode the json received from [ {} ].", self.url),
                    AlertLevel::Error,
                ));
                return;
            }
        };

        if payload.is_null() {
            result.events.push(self.events.build(
                "returned an empty json",
                format!("the json received from url [ {} ] has no content.", self.url),
                AlertLevel::Error,
            ));
            return;
        }

        let empty = Map::new();
        let fields = payload.as_object().unwrap_or(&empty);

        result.derived_tags = extract::derive_tags(fields, &self.spec.tag_keys);

        let mut payload_tags = self.tags.clone();
        payload_tags.extend(result.derived_tags.iter().cloned());

        for metric in extract::payload_metrics(fields, self.spec.metric_definitions.as_ref()) {
            result.metrics.push(metric.with_tags(payload_tags.clone()));
        }
    }
}
