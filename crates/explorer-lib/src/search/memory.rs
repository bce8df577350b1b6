//! Memory quantity parsing and the request/limit imbalance heuristic

use crate::models::Resource;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Limit-to-request ratio at or above which a container is flagged
pub const MEMORY_IMBALANCE_RATIO: f64 = 2.0;

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)([a-zA-Z]*)$")
        .expect("valid quantity regex")
});

/// Parse a Kubernetes quantity such as `128Mi`, `1G` or `1e9` into bytes
///
/// JSON numbers are taken as bytes. Unknown suffixes and negative
/// quantities yield `None`.
pub fn parse_quantity(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| *v >= 0.0),
        Value::String(s) => parse_quantity_str(s),
        _ => None,
    }
}

pub fn parse_quantity_str(quantity: &str) -> Option<f64> {
    let quantity = quantity.trim();
    let caps = QUANTITY.captures(quantity)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let multiplier: f64 = match unit {
        "" => 1.0,
        "Ki" => 1024.0,
        "Mi" => 1024.0_f64.powi(2),
        "Gi" => 1024.0_f64.powi(3),
        "Ti" => 1024.0_f64.powi(4),
        "Pi" => 1024.0_f64.powi(5),
        "Ei" => 1024.0_f64.powi(6),
        "m" => 1e-3,
        "k" | "K" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        _ => return None,
    };

    Some(value * multiplier)
}

/// True if one container's memory limit is out of proportion with its request
///
/// Flags a limit without a request, or a positive request whose limit is at
/// least [`MEMORY_IMBALANCE_RATIO`] times larger. Unparseable quantities
/// never flag.
pub fn container_memory_imbalanced(container: &Value) -> bool {
    let resources = container.get("resources");
    let request = resources
        .and_then(|r| r.get("requests"))
        .and_then(|r| r.get("memory"))
        .filter(|v| !v.is_null());
    let limit = resources
        .and_then(|r| r.get("limits"))
        .and_then(|r| r.get("memory"))
        .filter(|v| !v.is_null());

    let Some(limit) = limit.and_then(parse_quantity) else {
        return false;
    };

    match request {
        None => true,
        Some(request) => match parse_quantity(request) {
            Some(request) if request > 0.0 => limit / request >= MEMORY_IMBALANCE_RATIO,
            _ => false,
        },
    }
}

/// True if any container of the resource's pod spec is imbalanced
pub fn has_memory_imbalance(resource: &Resource) -> bool {
    resource.containers().iter().any(container_memory_imbalanced)
}
