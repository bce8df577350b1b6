//! Resource listing commands

use anyhow::Result;
use chrono::Utc;
use explorer_lib::{FilterPredicate, ResourceKind};
use tabled::Tabled;

use crate::backend::Backend;
use crate::output::{color_status, print_info, print_json, print_table, OutputFormat};

/// Row for the resource table
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Ready")]
    ready: String,
    #[tabled(rename = "Age")]
    age: String,
}

/// List resources of one kind with optional filters
pub async fn list_resources(
    backend: &Backend,
    kind: ResourceKind,
    predicate: FilterPredicate,
    format: OutputFormat,
) -> Result<()> {
    let (items, total) = backend.list(kind, &predicate).await?;

    match format {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Table => {
            let now = Utc::now();
            let shown = items.len();
            let rows = items
                .iter()
                .map(|resource| ResourceRow {
                    name: resource.name().to_string(),
                    namespace: resource.namespace().unwrap_or("-").to_string(),
                    status: color_status(resource.status_label()),
                    ready: resource
                        .ready_replicas_display()
                        .unwrap_or_else(|| "-".to_string()),
                    age: resource.age(now),
                })
                .collect();

            print_table(rows);
            if !predicate.is_empty() || shown != total {
                print_info(&format!("Showing {} of {} {}", shown, total, kind.label()));
            }
        }
    }

    Ok(())
}
