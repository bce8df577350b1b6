//! Component search scenarios

use super::*;
use crate::index::index_snapshot;
use serde_json::{json, Value};
use std::collections::HashSet;

fn two_pods() -> SnapshotIndex {
    index_snapshot(&json!({
        "data": {
            "podList": {
                "items": [
                    {"metadata": {"name": "a", "namespace": "ns1"}, "spec": {"nodeSelector": {"disk": "ssd"}}},
                    {"metadata": {"name": "b", "namespace": "ns2"}, "spec": {}}
                ]
            }
        }
    }))
}

fn mixed_cluster() -> Value {
    json!({
        "data": {
            "podList": [
                {"metadata": {"name": "p1", "namespace": "prod", "labels": {"app": "web"}},
                 "spec": {"tolerations": [{"key": "gpu"}],
                          "containers": [{"name": "c", "readinessProbe": {"tcpSocket": {"port": 80}},
                                          "resources": {"requests": {"memory": "128Mi"}, "limits": {"memory": "512Mi"}}}]}},
                {"metadata": {"name": "p2", "namespace": "prod"},
                 "spec": {"containers": [{"name": "c",
                                          "resources": {"requests": {"memory": "256Mi"}, "limits": {"memory": "300Mi"}}}]}},
                {"metadata": {"name": "p3", "namespace": "dev"},
                 "spec": {"affinity": {"podAntiAffinity": {"requiredDuringSchedulingIgnoredDuringExecution": [{}]}}}}
            ],
            "deploymentList": {"items": [
                {"metadata": {"name": "web", "namespace": "prod"},
                 "spec": {"template": {"metadata": {"labels": {"app": "web"}},
                                       "spec": {"tolerations": [{"key": "spot"}], "containers": [{"name": "c"}]}}}}
            ]},
            "serviceList": [{"metadata": {"name": "svc", "namespace": "prod"}, "spec": {"ports": [{"port": 80}]}}],
            "podDisruptionBudgetList": [
                {"metadata": {"name": "web", "namespace": "prod"}, "spec": {"selector": {"matchLabels": {"app": "web"}}}}
            ]
        }
    })
}

fn names(result: &SearchResult) -> Vec<&str> {
    result.matches.iter().map(|m| m.name.as_str()).collect()
}

#[test]
fn test_include_node_selector() {
    let query = SearchQuery::new(vec![ComponentKey::NodeSelector], vec![ResourceKind::Pods], SearchMode::Include);
    let result = search(&query, &two_pods()).unwrap();

    assert_eq!(result.match_count, 1);
    assert_eq!(result.total_resources, 2);
    assert_eq!(
        result.matches,
        vec![MatchRecord {
            kind: ResourceKind::Pods,
            namespace: Some("ns1".to_string()),
            name: "a".to_string(),
            matched_components: vec![ComponentKey::NodeSelector],
            has_memory_imbalance: false,
        }]
    );
}

#[test]
fn test_exclude_node_selector() {
    let query = SearchQuery::new(vec![ComponentKey::NodeSelector], vec![ResourceKind::Pods], SearchMode::Exclude);
    let result = search(&query, &two_pods()).unwrap();

    assert_eq!(result.match_count, 1);
    assert_eq!(names(&result), vec!["b"]);
    assert!(result.matches[0].matched_components.is_empty());
}

#[test]
fn test_empty_selection_is_invalid() {
    let index = two_pods();

    let no_components = SearchQuery::new(vec![], vec![ResourceKind::Pods], SearchMode::Include);
    assert!(matches!(search(&no_components, &index), Err(ExplorerError::InvalidQuery(_))));

    let no_kinds = SearchQuery::new(vec![ComponentKey::NodeSelector], vec![], SearchMode::Exclude);
    assert!(matches!(search(&no_kinds, &index), Err(ExplorerError::InvalidQuery(_))));
}

#[test]
fn test_from_ids_rejects_unknown() {
    let err = SearchQuery::from_ids(&["nodeSelector"], &["widgets"], SearchMode::Include).unwrap_err();
    assert!(matches!(err, ExplorerError::UnsupportedKind(_)));

    let err = SearchQuery::from_ids(&["hostPID"], &["pods"], SearchMode::Include).unwrap_err();
    assert!(matches!(err, ExplorerError::UnknownComponent(_)));

    let query = SearchQuery::from_ids(&["resources.requests"], &["Pods"], SearchMode::Exclude).unwrap();
    assert_eq!(query.components, vec![ComponentKey::ResourceRequests]);
    assert_eq!(query.kinds, vec![ResourceKind::Pods]);
}

#[test]
fn test_memory_imbalance_flag() {
    let index = index_snapshot(&mixed_cluster());
    let query = SearchQuery::new(vec![ComponentKey::Tolerations], vec![ResourceKind::Pods], SearchMode::Exclude);
    let result = search(&query, &index).unwrap();

    assert_eq!(names(&result), vec!["p2", "p3"]);
    assert!(!result.matches[0].has_memory_imbalance);

    let query = SearchQuery::new(vec![ComponentKey::ReadinessProbe], vec![ResourceKind::Pods], SearchMode::Include);
    let result = search(&query, &index).unwrap();
    assert_eq!(names(&result), vec!["p1"]);
    assert!(result.matches[0].has_memory_imbalance);
}

#[test]
fn test_match_order_follows_kind_selection() {
    let index = index_snapshot(&mixed_cluster());
    let query = SearchQuery::new(
        vec![ComponentKey::Tolerations, ComponentKey::PodDisruptionBudget],
        vec![ResourceKind::Deployments, ResourceKind::Pods],
        SearchMode::Include,
    );
    let result = search(&query, &index).unwrap();

    assert_eq!(names(&result), vec!["web", "p1"]);
    assert_eq!(
        result.matches[0].matched_components,
        vec![ComponentKey::Tolerations, ComponentKey::PodDisruptionBudget]
    );
    assert_eq!(
        result.matches[1].matched_components,
        vec![ComponentKey::Tolerations, ComponentKey::PodDisruptionBudget]
    );
}

#[test]
fn test_duplicate_selections_collapse() {
    let index = index_snapshot(&mixed_cluster());
    let query = SearchQuery::new(
        vec![ComponentKey::Tolerations, ComponentKey::Tolerations],
        vec![ResourceKind::Pods, ResourceKind::Pods],
        SearchMode::Include,
    );
    let result = search(&query, &index).unwrap();

    assert_eq!(result.total_resources, 3);
    assert_eq!(names(&result), vec!["p1"]);
    assert_eq!(result.matches[0].matched_components, vec![ComponentKey::Tolerations]);
}

#[test]
fn test_empty_kind_contributes_nothing() {
    let index = index_snapshot(&mixed_cluster());
    let query = SearchQuery::new(
        vec![ComponentKey::NodeSelector],
        vec![ResourceKind::StatefulSets, ResourceKind::Services],
        SearchMode::Exclude,
    );
    let result = search(&query, &index).unwrap();

    assert_eq!(result.total_resources, 1);
    assert_eq!(names(&result), vec!["svc"]);
}

#[test]
fn test_include_exclude_partition_scanned_set() {
    let index = index_snapshot(&mixed_cluster());
    let components = vec![
        ComponentKey::Tolerations,
        ComponentKey::PodAntiAffinity,
        ComponentKey::StartupProbe,
    ];
    let kinds = vec![ResourceKind::Pods, ResourceKind::Deployments, ResourceKind::Services];

    let include = search(&SearchQuery::new(components.clone(), kinds.clone(), SearchMode::Include), &index).unwrap();
    let exclude = search(&SearchQuery::new(components, kinds, SearchMode::Exclude), &index).unwrap();

    let key = |m: &MatchRecord| (m.kind, m.namespace.clone(), m.name.clone());
    let included: HashSet<_> = include.matches.iter().map(key).collect();
    let excluded: HashSet<_> = exclude.matches.iter().map(key).collect();

    assert!(included.is_disjoint(&excluded));
    assert_eq!(included.len() + excluded.len(), include.total_resources);
    assert_eq!(include.total_resources, exclude.total_resources);
    assert!(include.match_count <= include.total_resources);
    assert_eq!(include.total_resources, 5);
}

#[test]
fn test_result_serialization_shape() {
    let query = SearchQuery::new(vec![ComponentKey::NodeSelector], vec![ResourceKind::Pods], SearchMode::Include);
    let result = search(&query, &two_pods()).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["matchCount"], json!(1));
    assert_eq!(value["totalResources"], json!(2));
    assert_eq!(value["matches"][0]["matchedComponents"], json!(["nodeSelector"]));
    assert_eq!(value["matches"][0]["hasMemoryImbalance"], json!(false));
    assert_eq!(value["matches"][0]["kind"], json!("pods"));
}
