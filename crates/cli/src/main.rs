//! Kubernetes Snapshot Explorer CLI
//!
//! Browses a cluster snapshot from a local file or a running explorer
//! server: counts, per-kind listings, component search and usage reports.

mod backend;
mod client;
mod commands;
mod config;
mod output;

use anyhow::{bail, Result};
use backend::Backend;
use clap::{Parser, Subcommand};
use commands::{catalog, reports, resources, search};
use explorer_lib::{ComponentKey, FilterPredicate, ResourceKind, SearchMode};
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kubernetes Snapshot Explorer CLI
#[derive(Parser)]
#[command(name = "kse")]
#[command(author, version, about = "Explore Kubernetes cluster snapshots", long_about = None)]
pub struct Cli {
    /// Snapshot file to read (can also be set via KSE_SNAPSHOT env var)
    #[arg(long, global = true, env = "KSE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Explorer server URL (can also be set via KSE_API_URL env var)
    #[arg(long, global = true, env = "KSE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show resource counts per kind
    Counts,

    /// Show counts grouped by section
    Sections,

    /// List resources of one kind
    List {
        /// Resource kind id (e.g. pods, deployments)
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Filter by namespace
        #[arg(long, short)]
        namespace: Option<String>,

        /// Filter by classified status (e.g. Running, Ready)
        #[arg(long)]
        status: Option<String>,

        /// Only resources whose pod spec sets a nodeSelector
        #[arg(long)]
        node_selector: bool,

        /// Case-insensitive text search
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Search resources by configured components
    Search {
        /// Component to look for (repeatable)
        #[arg(long = "component", short = 'c', value_parser = parse_component, required = true)]
        components: Vec<ComponentKey>,

        /// Resource kind to scan (repeatable)
        #[arg(long = "kind", short = 'k', value_parser = parse_kind, required = true)]
        kinds: Vec<ResourceKind>,

        /// Return resources that have none of the components
        #[arg(long)]
        exclude: bool,
    },

    /// Count component usage per resource kind
    Report {
        /// Component to count (repeatable)
        #[arg(long = "component", short = 'c', value_parser = parse_component, required = true)]
        components: Vec<ComponentKey>,

        /// Resource kind to include (repeatable)
        #[arg(long = "kind", short = 'k', value_parser = parse_kind, required = true)]
        kinds: Vec<ResourceKind>,
    },

    /// Show an exported best-practices report
    BestPractices {
        /// Report file path
        file: PathBuf,
    },

    /// Show an exported node-pods report
    NodePods {
        /// Report file path
        file: PathBuf,
    },

    /// List searchable components
    Components,

    /// List supported resource kinds
    Kinds,
}

fn parse_kind(id: &str) -> std::result::Result<ResourceKind, String> {
    ResourceKind::parse(id).map_err(|e| e.to_string())
}

fn parse_component(id: &str) -> std::result::Result<ComponentKey, String> {
    ComponentKey::parse(id).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| config.default_format.as_deref().and_then(OutputFormat::from_name))
        .unwrap_or_default();

    // Commands that need no snapshot source
    match &cli.command {
        Commands::BestPractices { file } => return reports::show_best_practices(file, format),
        Commands::NodePods { file } => return reports::show_node_pods(file, format),
        Commands::Components => return catalog::list_components(format),
        Commands::Kinds => return catalog::list_kinds(format),
        _ => {}
    }

    let backend = resolve_backend(&cli, &config)?;

    match cli.command {
        Commands::Counts => catalog::show_counts(&backend, format).await?,
        Commands::Sections => catalog::show_sections(&backend, format).await?,
        Commands::List {
            kind,
            namespace,
            status,
            node_selector,
            search,
        } => {
            let predicate = FilterPredicate {
                namespace,
                status,
                has_node_selector: node_selector,
                search_term: search,
            };
            resources::list_resources(&backend, kind, predicate, format).await?;
        }
        Commands::Search {
            components,
            kinds,
            exclude,
        } => {
            let mode = if exclude {
                SearchMode::Exclude
            } else {
                SearchMode::Include
            };
            search::run_search(&backend, &components, &kinds, mode, format).await?;
        }
        Commands::Report { components, kinds } => {
            search::run_report(&backend, &components, &kinds, format).await?;
        }
        Commands::BestPractices { .. }
        | Commands::NodePods { .. }
        | Commands::Components
        | Commands::Kinds => {}
    }

    Ok(())
}

/// Flags win over the config file; a snapshot file wins over a server URL
fn resolve_backend(cli: &Cli, config: &config::Config) -> Result<Backend> {
    if let Some(path) = &cli.snapshot {
        return Backend::local(path);
    }
    if let Some(url) = &cli.api_url {
        return Backend::remote(url);
    }
    if let Some(path) = &config.default_snapshot {
        return Backend::local(path);
    }
    if let Some(url) = &config.api_url {
        return Backend::remote(url);
    }
    bail!("No snapshot source: pass --snapshot <file> or --api-url <url>")
}
