//! Binary to route a drone fleet over a map file.
use std::path::PathBuf;

use airlift::{io, logging, run_routing};
use anyhow::Result;
use clap::Parser;

/// Airlift drone-fleet router.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the text file describing the map
    #[arg(required = true)]
    map: PathBuf,
    /// Write the per-drone route records to this JSON file
    #[arg(long)]
    routes: Option<PathBuf>,
    /// Also write the log, with debug details, to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize_logging(args.log_file.as_deref())?;
    let solution = run_routing(&args.map)?;
    if let Some(path) = &args.routes {
        io::json::write_routes(&solution.routes, path)?;
    }
    print!("{}", solution.schedule);
    Ok(())
}
