//! Component usage matrix per resource kind
//!
//! Counts are raw integers. Percentages are left to the presentation
//! layer, which must guard against kinds with no resources.

use crate::catalog::ResourceKind;
use crate::error::Result;
use crate::index::SnapshotIndex;
use crate::search::{component_present, validate_selection, ComponentKey};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

/// Presence count of one component within one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCell {
    pub resource_kind: ResourceKind,
    pub component: ComponentKey,
    pub count_present: usize,
    pub total_resources_of_kind: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub kind: ResourceKind,
    pub total_resources: usize,
    pub cells: Vec<ReportCell>,
}

impl ReportRow {
    pub fn count(&self, component: ComponentKey) -> Option<usize> {
        self.cells
            .iter()
            .find(|cell| cell.component == component)
            .map(|cell| cell.count_present)
    }
}

/// Rows in kind selection order
///
/// Serializes as `{ kind: { "total_resources": n, "<component>": count, ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentReport {
    pub components: Vec<ComponentKey>,
    pub rows: Vec<ReportRow>,
}

impl ComponentReport {
    pub fn row(&self, kind: ResourceKind) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.kind == kind)
    }
}

impl Serialize for ComponentReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for row in &self.rows {
            map.serialize_entry(row.kind.as_str(), &RowView(row))?;
        }
        map.end()
    }
}

struct RowView<'a>(&'a ReportRow);

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let row = self.0;
        let mut map = serializer.serialize_map(Some(row.cells.len() + 1))?;
        map.serialize_entry("total_resources", &row.total_resources)?;
        for cell in &row.cells {
            map.serialize_entry(cell.component.as_str(), &cell.count_present)?;
        }
        map.end()
    }
}

/// Count, per kind, the resources on which each component is present
///
/// Columns are independent: one resource can count toward several.
pub fn aggregate(
    components: &[ComponentKey],
    kinds: &[ResourceKind],
    index: &SnapshotIndex,
) -> Result<ComponentReport> {
    let (components, kinds) = validate_selection(components, kinds)?;
    let budgets = index.resources_of(ResourceKind::PodDisruptionBudgets);

    let rows = kinds
        .iter()
        .map(|kind| {
            let resources = index.resources_of(*kind);
            let cells = components
                .iter()
                .map(|component| ReportCell {
                    resource_kind: *kind,
                    component: *component,
                    count_present: resources
                        .iter()
                        .filter(|r| component_present(*component, r, budgets))
                        .count(),
                    total_resources_of_kind: resources.len(),
                })
                .collect();

            ReportRow {
                kind: *kind,
                total_resources: resources.len(),
                cells,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        components = components.len(),
        kinds = rows.len(),
        "Component report aggregated"
    );

    Ok(ComponentReport { components, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use crate::index::index_snapshot;
    use serde_json::json;

    fn index() -> SnapshotIndex {
        index_snapshot(&json!({
            "data": {
                "podList": [
                    {"metadata": {"name": "a"}, "spec": {"nodeSelector": {"d": "1"}, "tolerations": [{}]}},
                    {"metadata": {"name": "b"}, "spec": {"tolerations": [{}]}},
                    {"metadata": {"name": "c"}, "spec": {}}
                ],
                "deploymentList": {"items": [
                    {"metadata": {"name": "d"}, "spec": {"template": {"spec": {"nodeSelector": {"d": "1"}}}}}
                ]}
            }
        }))
    }

    #[test]
    fn test_counts_are_independent_columns() {
        let report = aggregate(
            &[ComponentKey::NodeSelector, ComponentKey::Tolerations],
            &[ResourceKind::Pods, ResourceKind::Deployments],
            &index(),
        )
        .unwrap();

        let pods = report.row(ResourceKind::Pods).unwrap();
        assert_eq!(pods.total_resources, 3);
        assert_eq!(pods.count(ComponentKey::NodeSelector), Some(1));
        assert_eq!(pods.count(ComponentKey::Tolerations), Some(2));

        let deployments = report.row(ResourceKind::Deployments).unwrap();
        assert_eq!(deployments.count(ComponentKey::NodeSelector), Some(1));
        assert_eq!(deployments.count(ComponentKey::Tolerations), Some(0));
    }

    #[test]
    fn test_column_never_exceeds_total() {
        let components: Vec<_> = ComponentKey::all().collect();
        let kinds: Vec<_> = ResourceKind::all().collect();
        let report = aggregate(&components, &kinds, &index()).unwrap();

        for row in &report.rows {
            for cell in &row.cells {
                assert!(cell.count_present <= row.total_resources);
                assert_eq!(cell.total_resources_of_kind, row.total_resources);
            }
        }
    }

    #[test]
    fn test_empty_kind_row_is_zero() {
        let report = aggregate(&[ComponentKey::NodeSelector], &[ResourceKind::Jobs], &index()).unwrap();
        let jobs = report.row(ResourceKind::Jobs).unwrap();
        assert_eq!(jobs.total_resources, 0);
        assert_eq!(jobs.count(ComponentKey::NodeSelector), Some(0));
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(matches!(
            aggregate(&[], &[ResourceKind::Pods], &index()),
            Err(ExplorerError::InvalidQuery(_))
        ));
        assert!(matches!(
            aggregate(&[ComponentKey::NodeSelector], &[], &index()),
            Err(ExplorerError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let report = aggregate(
            &[ComponentKey::NodeSelector, ComponentKey::ResourceRequests],
            &[ResourceKind::Pods],
            &index(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"pods": {"total_resources": 3, "nodeSelector": 1, "resources.requests": 0}})
        );
    }
}
