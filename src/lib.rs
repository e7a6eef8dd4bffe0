//! Library for Airlift: a turn-based drone-fleet routing simulator.
#![doc(html_no_source)]

pub mod error;
pub mod io;
pub mod logging;
pub mod network;
pub mod reservation;
pub mod router;
pub mod schedule;
pub mod time_graph;

use std::path::Path;

use anyhow::Result;
use log::info;

// Re-exports.
pub use error::RoutingError;
pub use router::{solve, Solution};

// Dependencies only used in the bin.
use clap as _;

/// Reads a map file, routes the whole fleet over it and returns the solution.
pub fn run_routing(path: &Path) -> Result<Solution> {
    let network = io::map_file::read_map(path)?;
    info!(
        "map loaded: {} hubs, {} connections, {} drones",
        network.hub_count(),
        network.nb_connections(),
        network.nb_drones()
    );
    let solution = router::solve(&network)?;
    Ok(solution)
}
