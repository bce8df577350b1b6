//! Structural filtering of resource lists
//!
//! Predicates are AND-combined and the filter is stable: matching
//! resources keep their original relative order.

use crate::catalog::ResourceKind;
use crate::models::Resource;
use crate::tree;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter predicate; every field is optional and unset fields do not constrain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterPredicate {
    /// Exact namespace match
    pub namespace: Option<String>,
    /// Status classification, compared case-insensitively
    pub status: Option<String>,
    /// When true, require a node selector or node affinity on the pod spec
    pub has_node_selector: bool,
    /// Case-insensitive substring over name, namespace and labels
    pub search_term: Option<String>,
}

impl FilterPredicate {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_node_selector(mut self) -> Self {
        self.has_node_selector = true;
        self
    }

    pub fn search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// True if no field constrains the result
    pub fn is_empty(&self) -> bool {
        blank(&self.namespace) && blank(&self.status) && !self.has_node_selector && blank(&self.search_term)
    }

    /// Evaluate the predicate against one resource
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(namespace) = non_blank(&self.namespace) {
            if resource.namespace() != Some(namespace) {
                return false;
            }
        }

        if let Some(status) = non_blank(&self.status) {
            if !resource.status_label().eq_ignore_ascii_case(status) {
                return false;
            }
        }

        if self.has_node_selector && !has_node_selector(resource) {
            return false;
        }

        if let Some(term) = non_blank(&self.search_term) {
            let haystack = search_text(resource).to_lowercase();
            if !haystack.contains(&term.to_lowercase()) {
                return false;
            }
        }

        true
    }
}

fn blank(value: &Option<String>) -> bool {
    non_blank(value).is_none()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Stable filter over a resource list
pub fn filter<'a>(resources: &'a [Resource], predicate: &FilterPredicate) -> Vec<&'a Resource> {
    resources.iter().filter(|r| predicate.matches(r)).collect()
}

/// Text matched by search terms: name, namespace, then `key:value` labels, space-joined
pub fn search_text(resource: &Resource) -> String {
    let labels = resource
        .metadata
        .labels
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} {} {}",
        resource.name(),
        resource.namespace().unwrap_or_default(),
        labels
    )
}

/// Non-empty `nodeSelector`, or a present `affinity.nodeAffinity`, on the pod spec
///
/// Kinds without a pod spec are checked at `spec` directly.
pub fn has_node_selector(resource: &Resource) -> bool {
    let spec = resource.pod_spec().unwrap_or_else(|| resource.spec());
    tree::is_present(spec.get("nodeSelector"))
        || tree::is_present(tree::resolve_dotted(spec, "affinity.nodeAffinity"))
}

/// Kind-specific status classification
pub fn classify_status(kind: ResourceKind, status: &Value) -> &str {
    use ResourceKind::*;

    match kind {
        Pods | Rollouts => tree::non_empty_str(status.get("phase")).unwrap_or("Unknown"),
        Deployments | StatefulSets | DaemonSets => {
            let available = tree::number_or_zero(status.get("availableReplicas"));
            let replicas = tree::number_or_zero(status.get("replicas"));
            if available == replicas && replicas > 0.0 {
                "Ready"
            } else if available < replicas {
                "Progressing"
            } else {
                "Not Ready"
            }
        }
        Jobs => {
            if tree::is_truthy(status.get("succeeded")) {
                "Completed"
            } else if tree::is_truthy(status.get("active")) {
                "Running"
            } else if tree::is_truthy(status.get("failed")) {
                "Failed"
            } else {
                "Pending"
            }
        }
        ReplicaSets => {
            let available = tree::number_or_zero(status.get("availableReplicas"));
            let replicas = tree::number_or_zero(status.get("replicas"));
            if available == replicas && replicas > 0.0 {
                "Ready"
            } else {
                "Not Ready"
            }
        }
        _ => "Unknown",
    }
}
