//! Label selector evaluation for PodDisruptionBudget coverage

use serde_json::{Map, Value};

/// Evaluate a `LabelSelector` (`matchLabels` + `matchExpressions`) against labels
///
/// A selector with no requirements matches everything. Malformed
/// requirements match nothing.
pub fn selector_matches(selector: &Value, labels: &Map<String, Value>) -> bool {
    let Some(selector) = selector.as_object() else {
        return false;
    };

    let labels_ok = match selector.get("matchLabels") {
        None | Some(Value::Null) => true,
        Some(Value::Object(required)) => required
            .iter()
            .all(|(key, value)| {
                label_value(labels, key).is_some_and(|actual| Some(actual) == scalar(value))
            }),
        Some(_) => false,
    };

    let expressions_ok = match selector.get("matchExpressions") {
        None | Some(Value::Null) => true,
        Some(Value::Array(expressions)) => expressions
            .iter()
            .all(|expression| expression_matches(expression, labels)),
        Some(_) => false,
    };

    labels_ok && expressions_ok
}

fn expression_matches(expression: &Value, labels: &Map<String, Value>) -> bool {
    let Some(key) = expression.get("key").and_then(Value::as_str) else {
        return false;
    };
    let values: Vec<String> = expression
        .get("values")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(scalar).collect())
        .unwrap_or_default();
    let actual = label_value(labels, key);

    match expression.get("operator").and_then(Value::as_str) {
        Some("In") => actual.is_some_and(|v| values.contains(&v)),
        Some("NotIn") => actual.map_or(true, |v| !values.contains(&v)),
        Some("Exists") => actual.is_some(),
        Some("DoesNotExist") => actual.is_none(),
        _ => false,
    }
}

fn label_value(labels: &Map<String, Value>, key: &str) -> Option<String> {
    labels.get(key).and_then(scalar)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        _ => None,
    }
}
