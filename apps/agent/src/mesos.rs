//! Built-in check sequence for Mesos masters.

use checkup::spec::{CheckSpec, MetricDef, MetricDefs, transforms};

/// Metric namespace for every Mesos check.
pub const NAMESPACE: &str = "mesos";

/// Fields of `state.json` surfaced as tags on this check and everything
/// that runs after it.
const STATE_TAG_KEYS: [&str; 6] = ["version", "leader", "pid", "id", "git_branch", "git_sha"];

/// Task and slave counters read straight off `state.json`.
const STATE_COUNTERS: [&str; 8] = [
    "activated_slaves",
    "deactivated_slaves",
    "failed_tasks",
    "finished_tasks",
    "killed_tasks",
    "lost_tasks",
    "staged_tasks",
    "started_tasks",
];

/// The `master/state.json` check: allow-listed counters plus cluster
/// identity tags.
pub fn master_state() -> CheckSpec {
    let mut definitions = MetricDefs::new();
    for field in STATE_COUNTERS {
        definitions.insert(field.to_string(), MetricDef::default());
    }
    definitions.insert("slaves".to_string(), MetricDef::transformed(transforms::length));
    definitions.insert("completed_frameworks".to_string(), MetricDef::transformed(transforms::length));

    CheckSpec::new("master.state", "master/state.json")
        .with_tag_keys(&STATE_TAG_KEYS)
        .with_metric_definitions(definitions)
}

/// The `master/stats.json` check: every numeric stat becomes a gauge.
pub fn master_stats() -> CheckSpec {
    CheckSpec::new("master.stats", "master/stats.json")
}

/// Ordered sequence for one master. State runs first so the identity tags
/// it derives annotate the stats metrics.
pub fn master_checks() -> Vec<CheckSpec> {
    vec![master_state(), master_stats()]
}
