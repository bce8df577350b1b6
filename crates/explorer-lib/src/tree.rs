//! Safe traversal helpers over untyped snapshot trees
//!
//! Snapshot bodies are kept as [`serde_json::Value`] trees (scalar,
//! sequence or mapping). Nothing in here panics or fails: a lookup that
//! misses, or lands on the wrong node type, yields `None`.

use serde_json::Value;

/// Maximum nesting depth visited while searching for an `items` list
pub const MAX_SEARCH_DEPTH: usize = 64;

/// Shared `null` for accessors that return a reference
pub(crate) static NULL: Value = Value::Null;

/// Find the first array-valued `items` key under `root`, depth-first
///
/// Mapping values and sequence elements are visited in document order.
/// A non-array `items` value is descended into like any other node.
pub fn find_items(root: &Value) -> Option<&Vec<Value>> {
    find_items_at(root, 0)
}

fn find_items_at(node: &Value, depth: usize) -> Option<&Vec<Value>> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "items" {
                    if let Value::Array(items) = value {
                        return Some(items);
                    }
                }
                if let Some(found) = find_items_at(value, depth + 1) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(elements) => elements
            .iter()
            .find_map(|element| find_items_at(element, depth + 1)),
        _ => None,
    }
}

/// Resolve a sequence of mapping keys starting at `root`
pub fn resolve_path<'a, S: AsRef<str>>(root: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(segment.as_ref()))
}

/// Resolve a dotted path such as `affinity.nodeAffinity`
pub fn resolve_dotted<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    resolve_path(root, &segments)
}

/// Presence test used by component checks
///
/// Absent, `null`, empty mappings and empty sequences are not present;
/// any other scalar, non-empty mapping or non-empty sequence is.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Loose truthiness: absent, `null`, `false`, zero and `""` are false
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Numeric field read, defaulting to zero when absent or not a number
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

/// String field read, `None` for non-strings and empty strings
pub fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
