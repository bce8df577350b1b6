//! Counts, sections and catalog listings

use anyhow::Result;
use colored::Colorize;
use explorer_lib::{
    search::ComponentCheck, summarize_sections, ComponentKey, ResourceKind, Section,
};
use tabled::Tabled;

use crate::backend::Backend;
use crate::output::{print_heading, print_json, print_table, print_warning, OutputFormat};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Raw Key")]
    raw_key: String,
    #[tabled(rename = "Namespaced")]
    namespaced: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Check")]
    check: String,
}

/// Show resource counts per kind
pub async fn show_counts(backend: &Backend, format: OutputFormat) -> Result<()> {
    let counts = backend.counts().await?;

    match format {
        OutputFormat::Json => print_json(&counts)?,
        OutputFormat::Table => {
            if counts.all_zero() {
                print_warning("Snapshot contains no resources");
            }
            let rows = counts
                .iter()
                .map(|(kind, count)| CountRow {
                    kind: kind.to_string(),
                    label: kind.label().to_string(),
                    count,
                })
                .collect();
            print_table(rows);
            println!("Total: {}", counts.total().to_string().bold());
        }
    }

    Ok(())
}

/// Show counts grouped by browsing section
pub async fn show_sections(backend: &Backend, format: OutputFormat) -> Result<()> {
    let counts = backend.counts().await?;
    let sections = summarize_sections(&counts);

    match format {
        OutputFormat::Json => print_json(&sections)?,
        OutputFormat::Table => {
            for section in &sections {
                println!(
                    "{} {}",
                    section.title.bold(),
                    format!("({})", section.total).dimmed()
                );
                for kind in &section.kinds {
                    println!("  {:<28} {:>6}", kind.label, kind.count);
                }
                println!();
            }
        }
    }

    Ok(())
}

/// List the supported resource kinds
pub fn list_kinds(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let kinds: Vec<_> = ResourceKind::all().map(|k| k.spec()).collect();
            print_json(&kinds)?;
        }
        OutputFormat::Table => {
            for section in Section::ALL {
                print_heading(section.title());
                let rows = section
                    .kinds()
                    .map(|kind| KindRow {
                        kind: kind.to_string(),
                        label: kind.label().to_string(),
                        section: section.title().to_string(),
                        raw_key: kind.raw_key().to_string(),
                        namespaced: if kind.is_namespaced() { "Yes" } else { "No" }.to_string(),
                    })
                    .collect();
                print_table(rows);
                println!();
            }
        }
    }

    Ok(())
}

/// List the searchable components
pub fn list_components(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let components: Vec<_> = ComponentKey::all()
                .map(|key| serde_json::json!({"key": key, "label": key.label()}))
                .collect();
            print_json(&components)?;
        }
        OutputFormat::Table => {
            let rows = ComponentKey::all()
                .map(|key| ComponentRow {
                    key: key.to_string(),
                    label: key.label().to_string(),
                    check: describe_check(key.descriptor().check),
                })
                .collect();
            print_table(rows);
        }
    }

    Ok(())
}

fn describe_check(check: ComponentCheck) -> String {
    match check {
        ComponentCheck::SpecPath(path) => format!("spec.{}", path.join(".")),
        ComponentCheck::Container(path) => format!("containers[].{}", path.join(".")),
        ComponentCheck::DisruptionBudget => "matching PodDisruptionBudget".to_string(),
    }
}
