//! Lifecycle events emitted when a poll cycle fails.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity attached to a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Error => write!(f, "error"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Info => write!(f, "info"),
        }
    }
}

/// A discrete event describing one check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Wall-clock seconds since the epoch, stamped at construction.
    pub timestamp: i64,

    /// `<namespace>_<check name>`.
    pub event_type: String,

    pub alert_level: AlertLevel,

    pub title: String,

    pub text: String,

    /// Shared by every event a check emits; lets the sink correlate
    /// repeated failures of the same endpoint across poll cycles.
    pub aggregation_key: String,
}

/// Builds events for one check against one endpoint.
///
/// The aggregation key is the SHA-256 digest of the target URL, computed
/// once here and reused for every event the check ever emits.
#[derive(Debug, Clone)]
pub struct EventFactory {
    event_type: String,
    title_prefix: String,
    aggregation_key: String,
}

impl EventFactory {
    pub fn new(namespace: &str, check_name: &str, url: &str) -> Self {
        Self {
            event_type: format!("{namespace}_{check_name}"),
            title_prefix: format!("{namespace} check:{check_name}"),
            aggregation_key: hex::encode(Sha256::digest(url.as_bytes())),
        }
    }

    pub fn aggregation_key(&self) -> &str {
        &self.aggregation_key
    }

    /// Build an event stamped with the current wall clock.
    pub fn build(&self, title: &str, text: impl Into<String>, alert_level: AlertLevel) -> Event {
        Event {
            timestamp: Utc::now().timestamp(),
            event_type: self.event_type.clone(),
            alert_level,
            title: format!("{}:{}", self.title_prefix, title),
            text: text.into(),
            aggregation_key: self.aggregation_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_key_stable_within_a_check() {
        let factory = EventFactory::new("mesos", "master.state", "http://master:5050/master/state.json");
        let first = factory.build("url timeout", "timed out", AlertLevel::Error);
        let second = factory.build("connection error", "unable to connect", AlertLevel::Error);
        assert_eq!(first.aggregation_key, second.aggregation_key);
    }

    #[test]
    fn aggregation_key_distinct_across_urls() {
        let a = EventFactory::new("mesos", "master.state", "http://master-a:5050/master/state.json");
        let b = EventFactory::new("mesos", "master.state", "http://master-b:5050/master/state.json");
        assert_ne!(a.aggregation_key(), b.aggregation_key());
    }

    #[test]
    fn event_type_and_title_carry_the_check_name() {
        let factory = EventFactory::new("mesos", "master.stats", "http://master:5050/master/stats.json");
        let event = factory.build("invalid response code", "returned 500", AlertLevel::Error);
        assert_eq!(event.event_type, "mesos_master.stats");
        assert_eq!(event.title, "mesos check:master.stats:invalid response code");
        assert_eq!(event.alert_level, AlertLevel::Error);
        assert!(event.timestamp > 0);
    }
}
