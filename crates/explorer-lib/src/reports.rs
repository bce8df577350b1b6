//! Pre-computed cluster reports consumed for display
//!
//! Both report shapes are produced elsewhere; these models only read them.

use crate::catalog::ResourceKind;
use crate::error::Result;
use crate::loader::read_json_file;
use crate::models::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Coarse rating of a best-practices score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Poor,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::NeedsImprovement
        } else {
            Grade::Poor
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grade::Good => "Good",
            Grade::NeedsImprovement => "Needs Improvement",
            Grade::Poor => "Poor",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPracticeCheck {
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub score: f64,
    #[serde(default)]
    pub checks: Vec<BestPracticeCheck>,
}

impl CategoryReport {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPracticesReport {
    pub overall_score: f64,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryReport>,
}

impl BestPracticesReport {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json_file(path)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.overall_score)
    }

    /// Failed checks with their category name
    pub fn failed_checks(&self) -> impl Iterator<Item = (&str, &BestPracticeCheck)> {
        self.categories.iter().flat_map(|(category, report)| {
            report
                .checks
                .iter()
                .filter(|check| !check.passed)
                .map(move |check| (category.as_str(), check))
        })
    }
}

/// Pods grouped by the node they run on
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<Value>>")]
pub struct NodePodsReport {
    nodes: BTreeMap<String, Vec<Resource>>,
}

impl From<BTreeMap<String, Vec<Value>>> for NodePodsReport {
    fn from(raw: BTreeMap<String, Vec<Value>>) -> Self {
        let nodes = raw
            .into_iter()
            .map(|(node, pods)| {
                let pods = pods
                    .into_iter()
                    .map(|body| Resource::from_value(ResourceKind::Pods, body))
                    .collect();
                (node, pods)
            })
            .collect();
        Self { nodes }
    }
}

impl NodePodsReport {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json_file(path)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &[Resource])> {
        self.nodes
            .iter()
            .map(|(node, pods)| (node.as_str(), pods.as_slice()))
    }

    pub fn pod_count(&self, node: &str) -> usize {
        self.nodes.get(node).map(Vec::len).unwrap_or(0)
    }

    pub fn total_pods(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }
}

impl Serialize for NodePodsReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.nodes.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grades() {
        assert_eq!(Grade::from_score(80.0), Grade::Good);
        assert_eq!(Grade::from_score(79.9), Grade::NeedsImprovement);
        assert_eq!(Grade::from_score(60.0), Grade::NeedsImprovement);
        assert_eq!(Grade::from_score(12.0), Grade::Poor);
        assert_eq!(Grade::NeedsImprovement.to_string(), "Needs Improvement");
    }

    #[test]
    fn test_best_practices_parse() {
        let report: BestPracticesReport = serde_json::from_value(json!({
            "overall_score": 72,
            "categories": {
                "reliability": {"score": 50, "checks": [
                    {"name": "Probes", "passed": false, "details": "3 pods lack probes",
                     "explanation": "x", "recommendation": "add probes", "reference": "https://kubernetes.io"},
                    {"name": "Replicas", "passed": true}
                ]},
                "security": {"score": 90, "checks": []}
            }
        }))
        .unwrap();

        assert_eq!(report.grade(), Grade::NeedsImprovement);
        assert_eq!(report.categories["reliability"].grade(), Grade::Poor);
        let failed: Vec<_> = report.failed_checks().map(|(c, check)| (c, check.name.as_str())).collect();
        assert_eq!(failed, vec![("reliability", "Probes")]);
    }

    #[test]
    fn test_node_pods_parse() {
        let report: NodePodsReport = serde_json::from_value(json!({
            "node-a": [
                {"metadata": {"name": "p1", "namespace": "default"},
                 "spec": {"containers": [{"name": "a"}, {"name": "b"}]},
                 "status": {"phase": "Running"}}
            ],
            "node-b": []
        }))
        .unwrap();

        assert_eq!(report.pod_count("node-a"), 1);
        assert_eq!(report.pod_count("node-b"), 0);
        assert_eq!(report.total_pods(), 1);

        let (_, pods) = report.nodes().next().unwrap();
        assert_eq!(pods[0].status_label(), "Running");
        assert_eq!(pods[0].containers().len(), 2);
    }
}
