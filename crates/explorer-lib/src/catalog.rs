//! Closed catalog of supported resource kinds
//!
//! Every kind the explorer understands is listed once in [`CATALOG`]
//! together with the key its list is stored under in raw snapshot
//! payloads, its browsing section and where its pod spec lives.

use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource kind discriminator, serialized as the plural lowercase id (`"pods"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pods,
    Services,
    Deployments,
    StatefulSets,
    DaemonSets,
    Jobs,
    ReplicaSets,
    Nodes,
    Namespaces,
    Events,
    PersistentVolumes,
    PersistentVolumeClaims,
    StorageClasses,
    CsiNodes,
    ConfigMaps,
    HorizontalPodAutoscalers,
    PodDisruptionBudgets,
    Ingresses,
    NetworkPolicies,
    Roles,
    RoleBindings,
    ClusterRoles,
    ClusterRoleBindings,
    Rollouts,
}

/// Browsing section a kind is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Cluster,
    Workloads,
    Autoscaling,
    Networking,
    Storage,
    Configuration,
    Security,
}

impl Section {
    /// Sections in menu order
    pub const ALL: [Section; 7] = [
        Section::Cluster,
        Section::Workloads,
        Section::Autoscaling,
        Section::Networking,
        Section::Storage,
        Section::Configuration,
        Section::Security,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Cluster => "Cluster",
            Section::Workloads => "Workloads",
            Section::Autoscaling => "Autoscaling",
            Section::Networking => "Networking",
            Section::Storage => "Storage",
            Section::Configuration => "Configuration",
            Section::Security => "Security",
        }
    }

    /// Kinds belonging to this section, in catalog order
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        CATALOG
            .iter()
            .filter(move |entry| entry.section == *self)
            .map(|entry| entry.kind)
    }
}

/// Location of the pod spec inside a resource body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PodSpecLocation {
    /// Kind carries no pod spec
    None,
    /// `spec` is the pod spec
    Spec,
    /// `spec.template.spec`
    Template,
}

impl PodSpecLocation {
    /// Path segments from the resource root to the pod spec
    pub fn path(&self) -> Option<&'static [&'static str]> {
        match self {
            PodSpecLocation::None => None,
            PodSpecLocation::Spec => Some(&["spec"]),
            PodSpecLocation::Template => Some(&["spec", "template", "spec"]),
        }
    }

    /// Path segments from the resource root to the pod labels
    pub fn labels_path(&self) -> Option<&'static [&'static str]> {
        match self {
            PodSpecLocation::None => None,
            PodSpecLocation::Spec => Some(&["metadata", "labels"]),
            PodSpecLocation::Template => Some(&["spec", "template", "metadata", "labels"]),
        }
    }
}

/// Static catalog entry for one kind
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KindSpec {
    #[serde(skip)]
    pub kind: ResourceKind,
    /// Identifier used in URLs, queries and count maps
    pub id: &'static str,
    /// Key holding this kind's list under the payload `data` section
    pub raw_key: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub namespaced: bool,
    pub pod_spec: PodSpecLocation,
}

const fn entry(
    kind: ResourceKind,
    id: &'static str,
    raw_key: &'static str,
    label: &'static str,
    section: Section,
    namespaced: bool,
    pod_spec: PodSpecLocation,
) -> KindSpec {
    KindSpec {
        kind,
        id,
        raw_key,
        label,
        section,
        namespaced,
        pod_spec,
    }
}

use PodSpecLocation as P;
use ResourceKind as K;

/// The closed catalog, in menu order
pub static CATALOG: [KindSpec; 24] = [
    entry(K::Nodes, "nodes", "nodeList", "Nodes", Section::Cluster, false, P::None),
    entry(K::Namespaces, "namespaces", "namespaceList", "Namespaces", Section::Cluster, false, P::None),
    entry(K::Events, "events", "eventList", "Events", Section::Cluster, true, P::None),
    entry(K::Pods, "pods", "podList", "Pods", Section::Workloads, true, P::Spec),
    entry(K::Deployments, "deployments", "deploymentList", "Deployments", Section::Workloads, true, P::Template),
    entry(K::StatefulSets, "statefulsets", "statefulSetList", "Stateful Sets", Section::Workloads, true, P::Template),
    entry(K::DaemonSets, "daemonsets", "daemonSetList", "Daemon Sets", Section::Workloads, true, P::Template),
    entry(K::Jobs, "jobs", "jobList", "Jobs", Section::Workloads, true, P::Template),
    entry(K::ReplicaSets, "replicasets", "replicaSetList", "Replica Sets", Section::Workloads, true, P::Template),
    entry(K::Rollouts, "rollouts", "rolloutList", "Rollouts", Section::Workloads, true, P::Template),
    entry(K::HorizontalPodAutoscalers, "horizontalpodautoscalers", "horizontalPodAutoscalerList", "Horizontal Pod Autoscalers", Section::Autoscaling, true, P::None),
    entry(K::PodDisruptionBudgets, "poddisruptionbudgets", "podDisruptionBudgetList", "Pod Disruption Budgets", Section::Autoscaling, true, P::None),
    entry(K::Services, "services", "serviceList", "Services", Section::Networking, true, P::None),
    entry(K::Ingresses, "ingresses", "ingressList", "Ingresses", Section::Networking, true, P::None),
    entry(K::NetworkPolicies, "networkpolicies", "networkPolicyList", "Network Policies", Section::Networking, true, P::None),
    entry(K::PersistentVolumes, "persistentvolumes", "persistentVolumeList", "Persistent Volumes", Section::Storage, false, P::None),
    entry(K::PersistentVolumeClaims, "persistentvolumeclaims", "persistentVolumeClaimList", "Persistent Volume Claims", Section::Storage, true, P::None),
    entry(K::StorageClasses, "storageclasses", "storageClassList", "Storage Classes", Section::Storage, false, P::None),
    entry(K::CsiNodes, "csinodes", "csiNodeList", "CSI Nodes", Section::Storage, false, P::None),
    entry(K::ConfigMaps, "configmaps", "configMapList", "Config Maps", Section::Configuration, true, P::None),
    entry(K::Roles, "roles", "roleList", "Roles", Section::Security, true, P::None),
    entry(K::RoleBindings, "rolebindings", "roleBindingList", "Role Bindings", Section::Security, true, P::None),
    entry(K::ClusterRoles, "clusterroles", "clusterRoleList", "Cluster Roles", Section::Security, false, P::None),
    entry(K::ClusterRoleBindings, "clusterrolebindings", "clusterRoleBindingList", "Cluster Role Bindings", Section::Security, false, P::None),
];

impl ResourceKind {
    /// Every kind, in catalog order
    pub fn all() -> impl Iterator<Item = ResourceKind> {
        CATALOG.iter().map(|entry| entry.kind)
    }

    /// Look up a kind by its identifier
    pub fn parse(id: &str) -> Result<Self> {
        let id = id.trim();
        CATALOG
            .iter()
            .find(|entry| entry.id.eq_ignore_ascii_case(id))
            .map(|entry| entry.kind)
            .ok_or_else(|| ExplorerError::UnsupportedKind(id.to_string()))
    }

    pub fn spec(&self) -> &'static KindSpec {
        // Every variant has exactly one catalog row; a missing row fails the catalog test
        CATALOG
            .iter()
            .find(|entry| entry.kind == *self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().id
    }

    pub fn raw_key(&self) -> &'static str {
        self.spec().raw_key
    }

    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    pub fn section(&self) -> Section {
        self.spec().section
    }

    pub fn is_namespaced(&self) -> bool {
        self.spec().namespaced
    }

    pub fn pod_spec_location(&self) -> PodSpecLocation {
        self.spec().pod_spec
    }

    /// True for pods and pod-template-bearing workloads
    pub fn has_pod_spec(&self) -> bool {
        self.pod_spec_location() != PodSpecLocation::None
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_covers_every_kind_once() {
        let kinds: HashSet<_> = CATALOG.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), CATALOG.len());

        for entry in CATALOG.iter() {
            assert_eq!(entry.kind.spec().id, entry.id);
        }
    }

    #[test]
    fn test_ids_match_serde_names() {
        for entry in CATALOG.iter() {
            let json = serde_json::to_value(entry.kind).unwrap();
            assert_eq!(json, serde_json::Value::String(entry.id.to_string()));
        }
    }

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!(ResourceKind::parse("pods").unwrap(), ResourceKind::Pods);
        assert_eq!(
            "StatefulSets".parse::<ResourceKind>().unwrap(),
            ResourceKind::StatefulSets
        );

        let err = ResourceKind::parse("cronjobs").unwrap_err();
        assert!(matches!(err, ExplorerError::UnsupportedKind(ref k) if k == "cronjobs"));
    }

    #[test]
    fn test_raw_keys() {
        assert_eq!(ResourceKind::Pods.raw_key(), "podList");
        assert_eq!(ResourceKind::CsiNodes.raw_key(), "csiNodeList");
        assert_eq!(
            ResourceKind::HorizontalPodAutoscalers.raw_key(),
            "horizontalPodAutoscalerList"
        );
    }

    #[test]
    fn test_sections() {
        let cluster: Vec<_> = Section::Cluster.kinds().collect();
        assert_eq!(
            cluster,
            vec![ResourceKind::Nodes, ResourceKind::Namespaces, ResourceKind::Events]
        );
        assert_eq!(ResourceKind::Rollouts.section(), Section::Workloads);
        assert_eq!(ResourceKind::CsiNodes.section(), Section::Storage);

        let total: usize = Section::ALL.iter().map(|s| s.kinds().count()).sum();
        assert_eq!(total, CATALOG.len());
    }

    #[test]
    fn test_pod_spec_locations() {
        assert_eq!(ResourceKind::Pods.pod_spec_location(), PodSpecLocation::Spec);
        assert_eq!(
            ResourceKind::Deployments.pod_spec_location(),
            PodSpecLocation::Template
        );
        assert!(!ResourceKind::Services.has_pod_spec());
        assert!(!ResourceKind::Nodes.is_namespaced());
    }
}
