//! teller-branch: branch-side entrypoint.
//!
//! Reads branch records from the input file and starts one branch server
//! per record, each bound to `base_port + id`. Blocks until the servers
//! exit.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use teller::bootstrap;
use teller::config::Config;
use teller::registry::PortOffsetResolver;
use teller::workload;

#[derive(Debug, Parser)]
#[command(
    name = "teller-branch",
    about = "Starts one branch server per branch record in the input file"
)]
struct Args {
    /// Path to the input file with branch/customer records.
    #[arg(short = 'i', long = "Input")]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::init_tracing();
    let args = Args::parse();

    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let records = workload::load_records(&args.input)?;
    let specs = workload::branches(&records);
    if specs.is_empty() {
        return Err("no branch records in input file".into());
    }

    info!(
        branches = specs.len(),
        base_port = config.network.base_port,
        "starting branch servers"
    );

    let resolver = Arc::new(PortOffsetResolver::from(&config.network));
    let handles = bootstrap::start_branches(&specs, &config, resolver).await?;

    for result in futures::future::try_join_all(handles).await? {
        result?;
    }
    Ok(())
}
