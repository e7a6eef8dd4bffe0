//! Sequential assignment of one route per drone.
pub mod pathfinder;

use itertools::Itertools;
use log::{debug, info};
use petgraph::graph::NodeIndex;
use serde_derive::Serialize;

use crate::error::RoutingError;
use crate::network::{Network, Turn};
use crate::reservation::ReservationTracker;
use crate::schedule::Schedule;
use crate::time_graph::TimeGraph;

/// One step of a committed drone route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub hub: String,
    pub turn: Turn,
}

/// The committed route of one drone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    /// 1-based drone id.
    pub drone: u32,
    /// Turn at which the drone reaches the end hub.
    pub arrival: Turn,
    pub hops: Vec<Hop>,
}

/// The full routing outcome: one route per drone and the turn-by-turn schedule.
#[derive(Clone, Debug)]
pub struct Solution {
    pub routes: Vec<RouteRecord>,
    pub schedule: Schedule,
}

/// Routes the whole fleet over the network.
///
/// Drones are routed one at a time in id order. Each accepted route immediately reserves the
/// hub and link capacities it consumes, so later drones plan around earlier ones; no route is
/// ever revisited. With the horizon sized by [Network::horizon], this greedy order reaches the
/// minimum possible arrival turn of the last drone.
pub fn solve(network: &Network) -> Result<Solution, RoutingError> {
    if !network.has_path() {
        return Err(RoutingError::Unreachable {
            start: network.hub_name(network.start()).to_owned(),
            end: network.hub_name(network.end()).to_owned(),
        });
    }
    let horizon = network
        .horizon()
        .ok_or_else(|| RoutingError::invariant("a reachable end hub must have a finite cost"))?;
    info!(
        "routing {} drones over turns 0..={horizon}",
        network.nb_drones()
    );
    let mut time_graph = TimeGraph::new(network, horizon);
    let mut tracker = ReservationTracker::default();
    let mut routes: Vec<Vec<NodeIndex>> = Vec::with_capacity(network.nb_drones() as usize);
    for drone in 1..=network.nb_drones() {
        let route = pathfinder::shortest_route(&time_graph, &tracker)
            .ok_or(RoutingError::NoRoute { drone })?;
        reserve_route(network, &mut time_graph, &mut tracker, &route)?;
        if let Some(&last) = route.last() {
            debug!("drone {drone} arrives at turn {}", time_graph.node(last).turn);
        }
        routes.push(route);
    }
    let schedule = Schedule::build(network, &time_graph, &routes);
    let routes = routes
        .iter()
        .enumerate()
        .map(|(index, route)| route_record(network, &time_graph, index as u32 + 1, route))
        .collect();
    Ok(Solution { routes, schedule })
}

/// Reserves the hub and link capacities consumed by a freshly-accepted route.
fn reserve_route(
    network: &Network,
    time_graph: &mut TimeGraph,
    tracker: &mut ReservationTracker,
    route: &[NodeIndex],
) -> Result<(), RoutingError> {
    for (source, target) in route.iter().copied().tuple_windows() {
        let Some(edge) = time_graph.graph().find_edge(source, target) else {
            return Err(RoutingError::invariant(format!(
                "consecutive route nodes {} and {} are not connected",
                describe(network, time_graph, source),
                describe(network, time_graph, target),
            )));
        };
        let entry = time_graph.node(source).turn;
        let data = time_graph.graph()[edge];
        if !tracker.is_traversable(edge, entry, &data) {
            return Err(RoutingError::invariant(format!(
                "link into {} is over capacity at turn {entry}",
                describe(network, time_graph, target),
            )));
        }
        tracker.reserve(edge, entry, &data);
    }
    // Every node but the pre-loaded start node counts against the hub capacity.
    for &node in route.iter().skip(1) {
        if !time_graph.node(node).can_enter() {
            return Err(RoutingError::invariant(format!(
                "hub {} is over capacity",
                describe(network, time_graph, node),
            )));
        }
        time_graph.add_occupant(node);
    }
    Ok(())
}

/// Formats a time node as `hub@turn` for diagnostics.
fn describe(network: &Network, time_graph: &TimeGraph, node: NodeIndex) -> String {
    let data = time_graph.node(node);
    format!("{}@{}", network.hub_name(data.hub), data.turn)
}

fn route_record(
    network: &Network,
    time_graph: &TimeGraph,
    drone: u32,
    route: &[NodeIndex],
) -> RouteRecord {
    let hops: Vec<Hop> = route
        .iter()
        .map(|&node| {
            let data = time_graph.node(node);
            Hop {
                hub: network.hub_name(data.hub).to_owned(),
                turn: data.turn,
            }
        })
        .collect();
    let arrival = hops.last().map_or(0, |hop| hop.turn);
    RouteRecord {
        drone,
        arrival,
        hops,
    }
}
