//! Console sink for manual runs.

use checkup::{Event, MetricSink};

/// Prints every metric and event as it arrives, so a manual run shows
/// exactly what a poll cycle produced.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    metrics: usize,
    events: usize,
}

impl ConsoleSink {
    pub fn metrics(&self) -> usize {
        self.metrics
    }

    pub fn events(&self) -> usize {
        self.events
    }

    fn print_metric(&mut self, method: &str, name: &str, value: f64, tags: &[String]) {
        self.metrics += 1;
        println!("metric [{method}] {name}={value} tags={}", tags.join(","));
    }
}

impl MetricSink for ConsoleSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.print_metric("gauge", name, value, tags);
    }

    fn rate(&mut self, name: &str, value: f64, tags: &[String]) {
        self.print_metric("rate", name, value, tags);
    }

    fn count(&mut self, name: &str, value: f64, tags: &[String]) {
        self.print_metric("count", name, value, tags);
    }

    fn event(&mut self, event: &Event) {
        self.events += 1;
        match serde_json::to_string(event) {
            Ok(json) => println!("event {json}"),
            Err(_) => println!("event {event:?}"),
        }
    }
}
