//! Charter CLI - Command-line interface
//!
//! Usage:
//!   charter extract <file>
//!   charter load <file> [--reset] [--dry-run]
//!   charter seed [--dry-run]

use std::path::{Path, PathBuf};

use anyhow::Context;
use charter_core::{AppConfig, GraphPlan, ParsedCharter};
use charter_extractor::{
    sample_graph, CharterGraphLoader, DependencyPatternExtractor, RelationExtractor,
};
use charter_graph::{GraphStore, InMemoryGraph, SurrealDbStore};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "charter")]
#[command(about = "Extract relations from charter abstracts into a CIDOC-CRM graph")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the extraction result of each charter as JSON
    Extract {
        /// JSON array of parsed charters
        file: PathBuf,
    },
    /// Extract relations and write them to the graph store
    Load {
        /// JSON array of parsed charters
        file: PathBuf,
        /// Delete all nodes and links first
        #[arg(long)]
        reset: bool,
        /// Use an in-memory store instead of SurrealDB
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the hand-built sample graph
    Seed {
        /// Use an in-memory store instead of SurrealDB
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let overlap = config.rules.overlapping_prepositions();
    if !overlap.is_empty() {
        warn!(?overlap, "Prepositions in both vocabularies are treated as locative");
    }

    match cli.command {
        Commands::Extract { file } => {
            let extractor = DependencyPatternExtractor::with_rules(&config.rules);
            for charter in read_charters(&file)? {
                let result = extractor.extract(&charter.sentence);
                let line = serde_json::json!({
                    "charter_id": charter.charter_id,
                    "result": result,
                });
                println!("{line}");
            }
        }
        Commands::Load {
            file,
            reset,
            dry_run,
        } => {
            let charters = read_charters(&file)?;
            let plan = build_plan(&config, &charters);
            let store = open_store(&config, dry_run).await?;
            write_plan(store.as_ref(), &plan, reset).await?;
        }
        Commands::Seed { dry_run } => {
            let store = open_store(&config, dry_run).await?;
            write_plan(store.as_ref(), &sample_graph(), false).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_charters(path: &Path) -> anyhow::Result<Vec<ParsedCharter>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let charters: Vec<ParsedCharter> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse charters in {}", path.display()))?;
    info!(count = charters.len(), file = %path.display(), "Read charters");
    Ok(charters)
}

fn build_plan(config: &AppConfig, charters: &[ParsedCharter]) -> GraphPlan {
    let extractor = DependencyPatternExtractor::with_rules(&config.rules);
    let mut loader = CharterGraphLoader::new();

    for charter in charters {
        let result = extractor.extract(&charter.sentence);
        loader.add_charter(charter, &result);
    }

    if !loader.skipped().is_empty() {
        info!(skipped = ?loader.skipped(), "Charters without a usable pattern");
    }
    loader.into_plan()
}

async fn open_store(config: &AppConfig, dry_run: bool) -> anyhow::Result<Box<dyn GraphStore>> {
    if dry_run {
        info!("Dry run, using in-memory graph");
        return Ok(Box::new(InMemoryGraph::new()));
    }

    let store = SurrealDbStore::new(&config.database).await?;
    store.init_schema().await?;
    Ok(Box::new(store))
}

async fn write_plan(store: &dyn GraphStore, plan: &GraphPlan, reset: bool) -> anyhow::Result<()> {
    if reset {
        store.clear().await?;
    }

    let report = store.apply(plan).await?;
    println!(
        "Created {} nodes ({} existing) and {} links ({} existing)",
        report.nodes_created, report.nodes_existing, report.links_created, report.links_existing
    );
    println!(
        "Graph now holds {} nodes and {} links",
        store.node_count().await?,
        store.link_count().await?
    );
    Ok(())
}
