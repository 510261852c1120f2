//! CLI entry point for titlegraph.
//!
//! Loads a file of extraction records (a JSON array of per-document
//! records), builds the ownership graph in memory, and answers title
//! queries as JSON on stdout. Logs go to stderr.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use titlegraph_core::{DocumentRecord, TitlegraphConfig};
use titlegraph_resolve::ResolveEngine;
use titlegraph_store::{ingest_document, GraphStore};

#[derive(Parser)]
#[command(name = "titlegraph")]
#[command(about = "Chain-of-title resolution over recorded-document extraction records")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file containing an array of extraction records.
    #[arg(short, long, global = true)]
    records: Option<String>,

    /// Config file prefix (default: titlegraph).
    #[arg(short, long, default_value = "titlegraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest the records and print per-document ingest reports.
    Ingest,
    /// Resolve current ownership of a tract.
    Ownership {
        /// Canonical tract key, e.g. ND-WILLIAMS-15-154N-97W-NW4.
        #[arg(long)]
        tract: String,
    },
    /// Detect chain-of-title gaps for a tract.
    Gaps {
        #[arg(long)]
        tract: String,
    },
    /// List a tract's chain of title in recording order.
    Chain {
        #[arg(long)]
        tract: String,
    },
    /// List instruments touching any tract in a section.
    Section {
        /// Section key, e.g. ND-WILLIAMS-15-154N-97W.
        #[arg(long)]
        section: String,
    },
    /// Print graph statistics after ingestion.
    Stats,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = TitlegraphConfig::load(&cli.config)?;

    let store = Arc::new(GraphStore::new());
    let reports = load_records(cli.records.as_deref(), &store)?;

    let engine = ResolveEngine::new(Arc::clone(&store)).with_settings(config.resolve);

    match cli.command {
        Command::Ingest => {
            println!("{}", serde_json::to_string(&reports)?);
        }
        Command::Ownership { ref tract } => {
            let result = engine.ownership(tract)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Gaps { ref tract } => {
            let result = engine.gaps(tract)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Chain { ref tract } => {
            let result = store.chain_of_title(tract)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Section { ref section } => {
            let result = store.instruments_for_section(section);
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Stats => {
            println!("{}", serde_json::to_string(&store.stats())?);
        }
    }

    Ok(())
}

/// Read and ingest the records file; stdin when no file is given.
fn load_records(
    path: Option<&str>,
    store: &GraphStore,
) -> anyhow::Result<Vec<titlegraph_store::IngestReport>> {
    let input = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let records: Vec<DocumentRecord> = serde_json::from_str(&input)?;

    let mut reports = Vec::with_capacity(records.len());
    for record in &records {
        reports.push(ingest_document(store, record)?);
    }
    Ok(reports)
}
