//! Core data models for snapshot resources

use crate::catalog::ResourceKind;
use crate::filter::classify_status;
use crate::tree::{self, NULL};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Object metadata extracted from a resource body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Leniently read `metadata`; wrong-typed fields fall back to empty values
    pub fn from_value(metadata: Option<&Value>) -> Self {
        let Some(metadata) = metadata else {
            return Self::default();
        };

        Self {
            name: tree::non_empty_str(metadata.get("name"))
                .unwrap_or_default()
                .to_string(),
            namespace: tree::non_empty_str(metadata.get("namespace")).map(str::to_string),
            uid: tree::non_empty_str(metadata.get("uid")).map(str::to_string),
            creation_timestamp: tree::non_empty_str(metadata.get("creationTimestamp"))
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
            labels: string_map(metadata.get("labels")),
            annotations: string_map(metadata.get("annotations")),
        }
    }
}

/// Read a string→string mapping, rendering non-string scalars as text
fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null | Value::Object(_) | Value::Array(_) => return None,
                other => other.to_string(),
            };
            Some((key.clone(), rendered))
        })
        .collect()
}

/// One Kubernetes object captured in a snapshot
///
/// The full body is retained so detail views can show it as-is; `spec`
/// and `status` are read from it on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub metadata: ObjectMeta,
    body: Value,
}

impl Resource {
    pub fn from_value(kind: ResourceKind, body: Value) -> Self {
        let metadata = ObjectMeta::from_value(body.get("metadata"));
        Self {
            kind,
            metadata,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn spec(&self) -> &Value {
        self.body.get("spec").unwrap_or(&NULL)
    }

    pub fn status(&self) -> &Value {
        self.body.get("status").unwrap_or(&NULL)
    }

    /// Pod spec for pods and pod-template-bearing workloads
    pub fn pod_spec(&self) -> Option<&Value> {
        let path = self.kind.pod_spec_location().path()?;
        tree::resolve_path(&self.body, path)
    }

    /// Labels applied to the pods this resource runs
    pub fn pod_labels(&self) -> Option<&serde_json::Map<String, Value>> {
        let path = self.kind.pod_spec_location().labels_path()?;
        tree::resolve_path(&self.body, path)?.as_object()
    }

    /// Container specs of the pod spec, empty for kinds without one
    pub fn containers(&self) -> &[Value] {
        self.pod_spec()
            .and_then(|spec| spec.get("containers"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Kind-specific status classification
    pub fn status_label(&self) -> &str {
        classify_status(self.kind, self.status())
    }

    /// Human-readable age relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(created) = self.metadata.creation_timestamp else {
            return "N/A".to_string();
        };

        let total_minutes = (now - created).num_minutes().max(0);
        let days = total_minutes / (60 * 24);
        let hours = (total_minutes % (60 * 24)) / 60;
        let minutes = total_minutes % 60;

        if days > 0 {
            format!("{}d {}h", days, hours)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes)
        } else {
            format!("{}m", minutes)
        }
    }

    /// `ready/total` replica display for replicated workloads
    pub fn ready_replicas_display(&self) -> Option<String> {
        if self.kind == ResourceKind::Pods {
            return None;
        }

        let status = self.status();
        let ready = [status.get("readyReplicas"), status.get("availableReplicas")]
            .into_iter()
            .find(|v| tree::is_truthy(*v))
            .map(tree::number_or_zero)
            .unwrap_or(0.0);
        let total = [status.get("replicas"), self.spec().get("replicas")]
            .into_iter()
            .find(|v| tree::is_truthy(*v))
            .map(tree::number_or_zero)
            .unwrap_or(0.0);

        Some(format!("{}/{}", ready, total))
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
