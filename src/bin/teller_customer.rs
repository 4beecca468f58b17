//! teller-customer: customer-side entrypoint.
//!
//! Runs each customer record from the input file as one batch against its
//! home branch, in input order, and optionally writes the collected
//! responses to the output file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use teller::bootstrap;
use teller::clients::CustomerDriver;
use teller::config::Config;
use teller::output;
use teller::registry::PortOffsetResolver;
use teller::workload;

#[derive(Debug, Parser)]
#[command(
    name = "teller-customer",
    about = "Runs every customer batch from the input file"
)]
struct Args {
    /// Path to the input file with branch/customer records.
    #[arg(short = 'i', long = "Input")]
    input: PathBuf,

    /// Path to the output file for batch responses.
    #[arg(short = 'o', long = "Output")]
    output: Option<PathBuf>,
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
    let specs = workload::customers(&records);

    let resolver = Arc::new(PortOffsetResolver::from(&config.network));
    let mut responses = Vec::with_capacity(specs.len());
    for spec in specs {
        let driver = CustomerDriver::new(spec.id, spec.events, resolver.clone());
        info!(customer = driver.id(), "dispatching batch");
        responses.push(driver.run().await?);
    }

    if let Some(path) = &args.output {
        output::write_responses(path, &responses)?;
        info!(path = %path.display(), "responses written");
    }
    Ok(())
}
