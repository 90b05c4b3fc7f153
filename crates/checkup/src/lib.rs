//! Checkup - polling monitoring-check engine.
//!
//! Fetches JSON status documents over HTTP, converts declared payload
//! fields into typed metrics and lifecycle events, and runs ordered
//! sequences of related checks whose discovered tags flow into the checks
//! that follow them.

pub mod check;
pub mod event;
pub mod extract;
pub mod metric;
pub mod runner;
pub mod sink;
pub mod spec;
pub mod transport;

// Re-export main types
pub use check::{PollResult, PollingCheck};
pub use event::{AlertLevel, Event, EventFactory};
pub use metric::{Metric, MetricKind};
pub use runner::{CheckRunner, RunTotals};
pub use sink::{MemorySink, MetricSink};
pub use spec::{CheckSpec, MetricDef, MetricDefs};
pub use transport::{FetchError, FetchResponse, HttpTransport, Transport};

/// Per-request timeout in seconds when none is configured.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;
