//! Failure taxonomy of the routing engine.
use thiserror::Error;

/// The ways the routing engine can fail on a validated network.
///
/// Map-shape problems (missing hubs, bad capacities) are reported earlier, when the network is
/// built.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The end hub cannot be reached from the start hub, even ignoring capacities.
    #[error("no path from start hub `{start}` to end hub `{end}`")]
    Unreachable { start: String, end: String },
    /// The pathfinder exhausted its frontier for a drone.
    ///
    /// With the horizon sized for the whole fleet this can only happen when the network
    /// violates its stated capacity invariants.
    #[error("no feasible route for drone {drone}")]
    NoRoute { drone: u32 },
    /// A capacity check failed after a reservation. This is a bug, not an input problem.
    #[error("capacity invariant violated: {0}")]
    InvariantViolation(String),
}

impl RoutingError {
    /// Creates an [RoutingError::InvariantViolation] from a diagnostic message.
    pub(crate) fn invariant(what: impl Into<String>) -> Self {
        RoutingError::InvariantViolation(what.into())
    }
}
