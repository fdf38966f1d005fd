use anyhow::Result;
use clap::{Parser, Subcommand};
use mini_query_engine::catalog::Catalog;
use mini_query_engine::classifier::classify;
use mini_query_engine::explain::explain;
use mini_query_engine::validation::validate;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "mini-query-engine")]
#[command(about = "Translate a natural language question into the canned SQL it maps to")]
struct Args {
    /// Path to a JSON catalog file (default: builtin tables)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the translated SQL and the rows it returns
    Classify { query: String },
    /// Print the detected table, query type and columns
    Explain { query: String },
    /// Check that the query is non-empty and names a table
    Validate { query: String },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    let output = match &args.command {
        Command::Classify { query } => {
            let classification = classify(query);
            debug!("Classified as {:?}", classification);
            serde_json::json!({
                "original_query": query,
                "translated_sql": classification.statement,
                "results": catalog.rows(classification.table).unwrap_or_default(),
            })
        }
        Command::Explain { query } => serde_json::to_value(explain(&catalog, query)?)?,
        Command::Validate { query } => serde_json::to_value(validate(&catalog, query))?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
