//! Component search and usage report commands

use anyhow::Result;
use colored::Colorize;
use explorer_lib::{ComponentKey, ResourceKind, SearchMode};
use serde_json::Value;
use tabled::{builder::Builder, settings::Style, Tabled};

use crate::backend::Backend;
use crate::output::{format_share, print_json, print_table, print_warning, yes_no, OutputFormat};

/// Row for search matches
#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Matched")]
    matched: String,
    #[tabled(rename = "Memory Imbalance")]
    memory_imbalance: String,
}

/// Search resources by configured components
pub async fn run_search(
    backend: &Backend,
    components: &[ComponentKey],
    kinds: &[ResourceKind],
    mode: SearchMode,
    format: OutputFormat,
) -> Result<()> {
    let result = backend.search(components, kinds, mode).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows = result
                .matches
                .iter()
                .map(|record| MatchRow {
                    kind: record.kind.label().to_string(),
                    namespace: record.namespace.clone().unwrap_or_else(|| "-".to_string()),
                    name: record.name.clone(),
                    matched: if record.matched_components.is_empty() {
                        "-".to_string()
                    } else {
                        record
                            .matched_components
                            .iter()
                            .map(ComponentKey::label)
                            .collect::<Vec<_>>()
                            .join(", ")
                    },
                    memory_imbalance: yes_no(record.has_memory_imbalance),
                })
                .collect();

            print_table(rows);
            println!(
                "{} of {} resources match ({} mode)",
                result.match_count.to_string().bold(),
                result.total_resources,
                mode
            );
        }
    }

    Ok(())
}

/// Show how many resources of each kind carry each component
pub async fn run_report(
    backend: &Backend,
    components: &[ComponentKey],
    kinds: &[ResourceKind],
    format: OutputFormat,
) -> Result<()> {
    let components = unique(components);
    let kinds = unique(kinds);
    let report = backend.report(&components, &kinds).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            let Some(rows) = report.as_object() else {
                print_warning("Report is empty");
                return Ok(());
            };

            let mut builder = Builder::default();
            let mut header = vec!["Kind".to_string(), "Total".to_string()];
            header.extend(components.iter().map(|key| key.label().to_string()));
            builder.push_record(header);

            for kind in &kinds {
                let Some(row) = rows.get(kind.as_str()) else {
                    continue;
                };
                let total = count_at(row, "total_resources");
                let mut record = vec![kind.label().to_string(), total.to_string()];
                record.extend(
                    components
                        .iter()
                        .map(|key| format_share(count_at(row, key.as_str()), total)),
                );
                builder.push_record(record);
            }

            println!("{}", builder.build().with(Style::rounded()));
        }
    }

    Ok(())
}

/// First occurrence of each selected id, in order
fn unique<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(*item);
        }
    }
    seen
}

fn count_at(row: &Value, key: &str) -> u64 {
    row.get(key).and_then(Value::as_u64).unwrap_or(0)
}
