//! # triage
//!
//! Command-line front end for the downlink planner: open a product catalog,
//! load the rule and similarity configurations, prioritize, and emit the
//! plan as JSON.
//!
//! ```bash
//! triage catalog.db rules.json similarity.json --output plan.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use triage_core::errors::PlanError;
use triage_core::traits::catalog::ProductCatalog;
use triage_core::traits::clock::SystemClock;
use triage_engine::{load_rule_config, load_similarity_config, prioritize};
use triage_storage::SqliteCatalog;

#[derive(Parser)]
#[command(name = "triage", about = "Prioritize catalogued science data products for downlink")]
struct Args {
    /// Path of the SQLite product catalog.
    catalog: PathBuf,

    /// Path of the rule configuration (JSON).
    rules: PathBuf,

    /// Path of the similarity configuration (JSON).
    similarity: PathBuf,

    /// Also write the plan to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Cooperative processing deadline in seconds.
    #[arg(long, default_value_t = 1e9)]
    max_seconds: f64,
}

#[derive(Serialize)]
struct PlannedProduct {
    id: i64,
    uri: String,
}

#[derive(Serialize)]
struct Plan {
    prioritized: Vec<PlannedProduct>,
}

/// Exit code for a timed-out run, distinct from plain failure.
const EXIT_TIMEOUT: i32 = 2;

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "triage=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog = SqliteCatalog::open(&args.catalog)
        .with_context(|| format!("opening catalog {}", args.catalog.display()))?;
    let rule_set = load_rule_config(&args.rules).context("loading rule configuration")?;
    let mut similarity =
        load_similarity_config(&args.similarity).context("loading similarity configuration")?;

    let clock = SystemClock::new();
    let ids = match prioritize(&catalog, &rule_set, &mut similarity, &clock, args.max_seconds) {
        Ok(ids) => ids,
        Err(PlanError::Timeout) => {
            tracing::error!("prioritization timed out");
            std::process::exit(EXIT_TIMEOUT);
        }
        Err(e) => return Err(e).context("prioritization failed"),
    };

    let mut prioritized = Vec::with_capacity(ids.len());
    for id in ids {
        let record = catalog.get(id).with_context(|| format!("reading product {id}"))?;
        prioritized.push(PlannedProduct { id, uri: record.uri });
    }
    let plan = Plan { prioritized };

    let rendered = serde_json::to_string_pretty(&plan)?;
    println!("{rendered}");
    if let Some(output) = &args.output {
        std::fs::write(output, &rendered)
            .with_context(|| format!("writing plan to {}", output.display()))?;
    }

    Ok(())
}
