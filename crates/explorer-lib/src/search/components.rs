//! Closed catalog of structural components checked by search and reports

use crate::error::{ExplorerError, Result};
use crate::models::Resource;
use crate::search::selector::selector_matches;
use crate::tree;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::fmt;
use std::str::FromStr;

/// Component identifier as it appears in queries and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKey {
    #[serde(rename = "topologySpreadConstraints")]
    TopologySpreadConstraints,
    #[serde(rename = "podAntiAffinity")]
    PodAntiAffinity,
    #[serde(rename = "podAffinity")]
    PodAffinity,
    #[serde(rename = "nodeAffinity")]
    NodeAffinity,
    #[serde(rename = "nodeSelector")]
    NodeSelector,
    #[serde(rename = "tolerations")]
    Tolerations,
    #[serde(rename = "topologyKeys")]
    TopologyKeys,
    #[serde(rename = "resources.requests")]
    ResourceRequests,
    #[serde(rename = "podDisruptionBudget")]
    PodDisruptionBudget,
    #[serde(rename = "livenessProbe")]
    LivenessProbe,
    #[serde(rename = "readinessProbe")]
    ReadinessProbe,
    #[serde(rename = "startupProbe")]
    StartupProbe,
}

/// How presence of a component is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentCheck {
    /// Path under `spec`, falling back to the pod template spec
    SpecPath(&'static [&'static str]),
    /// Path under any container of the pod spec
    Container(&'static [&'static str]),
    /// A PodDisruptionBudget in the namespace selects the pod labels
    DisruptionBudget,
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentDescriptor {
    pub key: ComponentKey,
    pub id: &'static str,
    pub label: &'static str,
    pub check: ComponentCheck,
}

const fn spec_path(
    key: ComponentKey,
    id: &'static str,
    label: &'static str,
    path: &'static [&'static str],
) -> ComponentDescriptor {
    ComponentDescriptor {
        key,
        id,
        label,
        check: ComponentCheck::SpecPath(path),
    }
}

const fn container(
    key: ComponentKey,
    id: &'static str,
    label: &'static str,
    path: &'static [&'static str],
) -> ComponentDescriptor {
    ComponentDescriptor {
        key,
        id,
        label,
        check: ComponentCheck::Container(path),
    }
}

use ComponentKey as C;

/// Descriptor table in picker order
pub static DESCRIPTORS: [ComponentDescriptor; 12] = [
    spec_path(C::TopologySpreadConstraints, "topologySpreadConstraints", "Topology Spread Constraints", &["topologySpreadConstraints"]),
    spec_path(C::PodAntiAffinity, "podAntiAffinity", "Pod Anti-Affinity", &["affinity", "podAntiAffinity"]),
    spec_path(C::PodAffinity, "podAffinity", "Pod Affinity", &["affinity", "podAffinity"]),
    spec_path(C::NodeAffinity, "nodeAffinity", "Node Affinity", &["affinity", "nodeAffinity"]),
    spec_path(C::NodeSelector, "nodeSelector", "Node Selector", &["nodeSelector"]),
    spec_path(C::Tolerations, "tolerations", "Tolerations", &["tolerations"]),
    spec_path(C::TopologyKeys, "topologyKeys", "Topology Keys", &["topologyKeys"]),
    container(C::ResourceRequests, "resources.requests", "Resource Requests", &["resources", "requests"]),
    ComponentDescriptor {
        key: C::PodDisruptionBudget,
        id: "podDisruptionBudget",
        label: "Pod Disruption Budget",
        check: ComponentCheck::DisruptionBudget,
    },
    container(C::LivenessProbe, "livenessProbe", "Liveness Probe", &["livenessProbe"]),
    container(C::ReadinessProbe, "readinessProbe", "Readiness Probe", &["readinessProbe"]),
    container(C::StartupProbe, "startupProbe", "Startup Probe", &["startupProbe"]),
];

impl ComponentKey {
    pub fn all() -> impl Iterator<Item = ComponentKey> {
        DESCRIPTORS.iter().map(|d| d.key)
    }

    /// Parse a component id; unknown ids are rejected
    pub fn parse(id: &str) -> Result<Self> {
        DESCRIPTORS
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.key)
            .ok_or_else(|| ExplorerError::UnknownComponent(id.to_string()))
    }

    pub fn descriptor(&self) -> &'static ComponentDescriptor {
        // DESCRIPTORS follows variant declaration order
        &DESCRIPTORS[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.descriptor().id
    }

    pub fn label(&self) -> &'static str {
        self.descriptor().label
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKey {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Presence test for one component on one resource
///
/// `budgets` is the PodDisruptionBudget list of the same snapshot; only the
/// cross-resource check reads it.
pub fn component_present(key: ComponentKey, resource: &Resource, budgets: &[Resource]) -> bool {
    match key.descriptor().check {
        ComponentCheck::SpecPath(path) => {
            tree::is_present(tree::resolve_path(resource.spec(), path))
                || resource
                    .pod_spec()
                    .is_some_and(|spec| tree::is_present(tree::resolve_path(spec, path)))
        }
        ComponentCheck::Container(path) => resource
            .containers()
            .iter()
            .any(|c| tree::is_present(tree::resolve_path(c, path))),
        ComponentCheck::DisruptionBudget => covered_by_budget(resource, budgets),
    }
}

fn covered_by_budget(resource: &Resource, budgets: &[Resource]) -> bool {
    if !resource.kind.has_pod_spec() {
        return false;
    }

    let empty = Map::new();
    let labels = resource.pod_labels().unwrap_or(&empty);

    budgets
        .iter()
        .filter(|pdb| pdb.namespace() == resource.namespace())
        .filter_map(|pdb| pdb.spec().get("selector"))
        .any(|selector| selector_matches(selector, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceKind;
    use serde_json::json;

    #[test]
    fn test_catalog_is_closed_and_round_trips() {
        assert_eq!(ComponentKey::all().count(), 12);
        for key in ComponentKey::all() {
            assert_eq!(ComponentKey::parse(key.as_str()).unwrap(), key);
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, json!(key.as_str()));
        }
        assert_eq!(ComponentKey::ResourceRequests.as_str(), "resources.requests");
        assert!(matches!(
            ComponentKey::parse("hostNetwork"),
            Err(ExplorerError::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_spec_path_presence() {
        let pod = Resource::from_value(
            ResourceKind::Pods,
            json!({"spec": {"affinity": {"podAntiAffinity": {"x": 1}, "nodeAffinity": {}}, "tolerations": []}}),
        );
        assert!(component_present(ComponentKey::PodAntiAffinity, &pod, &[]));
        assert!(!component_present(ComponentKey::NodeAffinity, &pod, &[]));
        assert!(!component_present(ComponentKey::Tolerations, &pod, &[]));
        assert!(!component_present(ComponentKey::PodAffinity, &pod, &[]));
    }

    #[test]
    fn test_scalar_at_intermediate_segment() {
        let pod = Resource::from_value(ResourceKind::Pods, json!({"spec": {"affinity": "none"}}));
        assert!(!component_present(ComponentKey::NodeAffinity, &pod, &[]));
    }

    #[test]
    fn test_template_spec_fallback() {
        let deployment = Resource::from_value(
            ResourceKind::Deployments,
            json!({"spec": {"template": {"spec": {
                "topologySpreadConstraints": [{"maxSkew": 1}],
                "containers": [{"name": "app", "livenessProbe": {"httpGet": {"path": "/"}}}]
            }}}}),
        );
        assert!(component_present(ComponentKey::TopologySpreadConstraints, &deployment, &[]));
        assert!(component_present(ComponentKey::LivenessProbe, &deployment, &[]));
        assert!(!component_present(ComponentKey::ReadinessProbe, &deployment, &[]));
    }

    #[test]
    fn test_container_requests() {
        let pod = Resource::from_value(
            ResourceKind::Pods,
            json!({"spec": {"containers": [
                {"name": "a", "resources": {}},
                {"name": "b", "resources": {"requests": {"cpu": "100m"}}}
            ]}}),
        );
        assert!(component_present(ComponentKey::ResourceRequests, &pod, &[]));
    }

    #[test]
    fn test_disruption_budget_coverage() {
        let budgets = vec![
            Resource::from_value(
                ResourceKind::PodDisruptionBudgets,
                json!({"metadata": {"name": "web-pdb", "namespace": "prod"},
                       "spec": {"selector": {"matchLabels": {"app": "web"}}}}),
            ),
        ];
        let web = Resource::from_value(
            ResourceKind::Deployments,
            json!({"metadata": {"name": "web", "namespace": "prod"},
                   "spec": {"template": {"metadata": {"labels": {"app": "web"}}, "spec": {}}}}),
        );
        let other_ns = Resource::from_value(
            ResourceKind::Deployments,
            json!({"metadata": {"name": "web", "namespace": "dev"},
                   "spec": {"template": {"metadata": {"labels": {"app": "web"}}, "spec": {}}}}),
        );
        let service = Resource::from_value(
            ResourceKind::Services,
            json!({"metadata": {"name": "web", "namespace": "prod"}, "spec": {}}),
        );

        assert!(component_present(ComponentKey::PodDisruptionBudget, &web, &budgets));
        assert!(!component_present(ComponentKey::PodDisruptionBudget, &other_ns, &budgets));
        assert!(!component_present(ComponentKey::PodDisruptionBudget, &service, &budgets));
        assert!(!component_present(ComponentKey::PodDisruptionBudget, &web, &[]));
    }
}
