//! Rendering of exported best-practices and node-pods reports

use anyhow::Result;
use colored::Colorize;
use explorer_lib::{BestPracticesReport, NodePodsReport};
use std::path::Path;
use tabled::Tabled;

use crate::output::{
    color_score, color_status, print_heading, print_json, print_success, print_table,
    OutputFormat,
};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Checks")]
    checks: String,
}

#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Containers")]
    containers: usize,
}

/// Show a best-practices report file
pub fn show_best_practices(path: &Path, format: OutputFormat) -> Result<()> {
    let report = BestPracticesReport::load(path)?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!(
        "Overall score: {} ({})",
        color_score(report.overall_score),
        report.grade()
    );
    println!();

    let rows = report
        .categories
        .iter()
        .map(|(name, category)| {
            let passed = category.checks.iter().filter(|check| check.passed).count();
            CategoryRow {
                category: name.clone(),
                score: color_score(category.score),
                grade: category.grade().to_string(),
                checks: format!("{}/{}", passed, category.checks.len()),
            }
        })
        .collect();
    print_table(rows);

    let mut failed = report.failed_checks().peekable();
    if failed.peek().is_none() {
        print_success("All checks passed");
        return Ok(());
    }

    println!();
    print_heading("Failed checks");
    for (category, check) in failed {
        println!("{} {} {}", "✗".red(), check.name.bold(), format!("[{}]", category).dimmed());
        if !check.details.is_empty() {
            println!("    {}", check.details);
        }
        if !check.recommendation.is_empty() {
            println!("    {} {}", "Recommendation:".cyan(), check.recommendation);
        }
        if let Some(reference) = &check.reference {
            println!("    {} {}", "Reference:".cyan(), reference);
        }
    }

    Ok(())
}

/// Show a node-pods report file
pub fn show_node_pods(path: &Path, format: OutputFormat) -> Result<()> {
    let report = NodePodsReport::load(path)?;

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    for (node, pods) in report.nodes() {
        print_heading(&format!("{} ({} pods)", node, pods.len()));
        let rows = pods
            .iter()
            .map(|pod| PodRow {
                name: pod.name().to_string(),
                namespace: pod.namespace().unwrap_or("-").to_string(),
                status: color_status(pod.status_label()),
                containers: pod.containers().len(),
            })
            .collect();
        print_table(rows);
        println!();
    }
    println!("Total: {} pods", report.total_pods().to_string().bold());

    Ok(())
}
