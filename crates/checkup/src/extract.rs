//! Field extraction: turning payload fields into metrics and tags.

use serde_json::{Map, Value};
use tracing::debug;

use crate::metric::{Metric, MetricKind};
use crate::spec::MetricDefs;

/// Numeric view of a payload value; metrics carry `f64` only.
fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Extract metrics through a declared field table.
///
/// Only fields present in both the table and the payload are emitted;
/// everything else in the payload is dropped. A field's transform, when
/// declared, is the sole reader of its raw value.
pub fn spec_metrics(payload: &Map<String, Value>, definitions: &MetricDefs) -> Vec<Metric> {
    let mut metrics = Vec::new();
    for (field, value) in payload {
        let Some(definition) = definitions.get(field) else {
            continue;
        };
        let resolved = match definition.transform {
            Some(transform) => transform(value),
            None => numeric(value),
        };
        match resolved {
            Some(value) => metrics.push(Metric::new(field.clone(), value, definition.kind)),
            None => debug!(field = %field, "declared field is not numeric, skipping"),
        }
    }
    metrics
}

/// Fallback extraction: every numeric top-level field becomes a gauge with
/// its raw value.
pub fn default_metrics(payload: &Map<String, Value>) -> Vec<Metric> {
    payload
        .iter()
        .filter_map(|(field, value)| match numeric(value) {
            Some(value) => Some(Metric::new(field.clone(), value, MetricKind::Gauge)),
            None => {
                debug!(field = %field, "non-numeric field without a definition, skipping");
                None
            }
        })
        .collect()
}

/// Run whichever extraction mode the spec calls for.
pub fn payload_metrics(payload: &Map<String, Value>, definitions: Option<&MetricDefs>) -> Vec<Metric> {
    match definitions {
        Some(definitions) => spec_metrics(payload, definitions),
        None => default_metrics(payload),
    }
}

/// Derive one `"key:value"` tag per declared key, in declared order.
///
/// Missing keys render the value as the literal `"None"`, so the output
/// length always equals `tag_keys.len()` and can be merged downstream
/// without a presence check.
pub fn derive_tags(payload: &Map<String, Value>, tag_keys: &[String]) -> Vec<String> {
    tag_keys
        .iter()
        .map(|key| {
            let value = payload.get(key).map(tag_value).unwrap_or_else(|| "None".to_string());
            format!("{key}:{value}")
        })
        .collect()
}

fn tag_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{transforms, MetricDef};
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test payload must be an object")
    }

    #[test]
    fn default_mode_emits_every_numeric_field_as_gauge() {
        let fields = payload(json!({"staged_tasks": 4, "mem_percent": 0.25, "version": "1.2.0"}));
        let metrics = default_metrics(&fields);

        assert_eq!(metrics.len(), 2);
        for metric in &metrics {
            assert_eq!(metric.kind, MetricKind::Gauge);
        }
        assert_eq!(metrics[0].name, "mem_percent");
        assert_eq!(metrics[0].value, 0.25);
        assert_eq!(metrics[1].name, "staged_tasks");
        assert_eq!(metrics[1].value, 4.0);
    }

    #[test]
    fn spec_mode_drops_fields_outside_the_table() {
        let mut definitions = MetricDefs::new();
        definitions.insert("activated_slaves".into(), MetricDef::default());

        let fields = payload(json!({"activated_slaves": 5, "uptime": 123.0}));
        let metrics = spec_metrics(&fields, &definitions);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "activated_slaves");
        assert_eq!(metrics[0].value, 5.0);
    }

    #[test]
    fn spec_mode_applies_declared_transforms() {
        let mut definitions = MetricDefs::new();
        definitions.insert("slaves".into(), MetricDef::transformed(transforms::length));

        let fields = payload(json!({"slaves": [1, 2, 3]}));
        let metrics = spec_metrics(&fields, &definitions);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, 3.0);
    }

    #[test]
    fn spec_mode_skips_untransformable_values_without_failing_the_batch() {
        let mut definitions = MetricDefs::new();
        definitions.insert("slaves".into(), MetricDef::transformed(transforms::length));
        definitions.insert("failed_tasks".into(), MetricDef::default());

        // "slaves" is not an array here, so its transform yields nothing.
        let fields = payload(json!({"slaves": "oops", "failed_tasks": 2}));
        let metrics = spec_metrics(&fields, &definitions);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "failed_tasks");
    }

    #[test]
    fn derived_tags_match_declared_keys_one_to_one() {
        let keys: Vec<String> = vec!["version".into(), "leader".into(), "git_sha".into()];
        let fields = payload(json!({"version": "1.2.0", "leader": "master@10.0.0.1:5050"}));

        let tags = derive_tags(&fields, &keys);

        assert_eq!(tags.len(), keys.len());
        assert_eq!(tags[0], "version:1.2.0");
        assert_eq!(tags[1], "leader:master@10.0.0.1:5050");
        assert_eq!(tags[2], "git_sha:None");
    }

    #[test]
    fn derived_tags_render_null_and_numbers() {
        let keys: Vec<String> = vec!["id".into(), "pid".into()];
        let fields = payload(json!({"id": 7, "pid": null}));

        let tags = derive_tags(&fields, &keys);

        assert_eq!(tags, vec!["id:7".to_string(), "pid:None".to_string()]);
    }
}
