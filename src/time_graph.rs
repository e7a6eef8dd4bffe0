//! The time-expanded graph over which the drone routes are computed.
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::network::{Category, Network, Turn, Zone};

/// A hub at a specific turn.
#[derive(Clone, Copy, Debug)]
pub struct TimeNode {
    /// Index of the hub in the static network.
    pub hub: NodeIndex,
    pub turn: Turn,
    pub zone: Zone,
    /// True if the hub is the end hub of the network.
    pub is_end: bool,
    /// Hub capacity, copied from the network so that entry checks need no extra lookup.
    pub max_drones: u32,
    /// Number of drones committed to be present at this hub at this turn.
    pub occupancy: u32,
}

impl TimeNode {
    /// Returns true if the hub lies in priority airspace.
    pub fn is_priority(&self) -> bool {
        self.zone == Zone::Priority
    }

    /// Returns true if one more drone can occupy the hub at this turn.
    pub fn can_enter(&self) -> bool {
        self.occupancy < self.max_drones
    }
}

/// A transition between two time nodes.
#[derive(Clone, Copy, Debug)]
pub struct TimeEdge {
    /// Number of turns consumed by the transition: 1, or 2 when flying into a restricted hub.
    pub duration: Turn,
    /// Maximum number of drones that can use the transition during the same turn.
    pub capacity: u32,
}

/// The static network unrolled over the turns `0..=horizon`.
///
/// The graph contains one [TimeNode] per non-blocked hub and turn, and two kinds of directed
/// [TimeEdge]s:
///
/// - Movement edges, one per directed link and departure turn, spanning the traversal cost of
///   the target hub. Their capacity is the link capacity.
/// - Wait edges from every hub to itself one turn later. Their capacity is the hub capacity,
///   since idling drones occupy the hub, not a link.
///
/// The structure is immutable once built; only the node occupancies change, when a route is
/// committed.
#[derive(Clone, Debug)]
pub struct TimeGraph {
    graph: DiGraph<TimeNode, TimeEdge>,
    lookup: HashMap<(NodeIndex, Turn), NodeIndex>,
    horizon: Turn,
    start: NodeIndex,
}

impl TimeGraph {
    /// Materializes the time-expanded graph of `network` up to `horizon`.
    pub fn new(network: &Network, horizon: Turn) -> Self {
        let mut graph = DiGraph::new();
        let mut lookup = HashMap::new();
        for turn in 0..=horizon {
            for (hub_id, hub) in network.hubs() {
                if hub.zone == Zone::Blocked {
                    continue;
                }
                // The whole fleet is parked at the start hub before the first turn.
                let occupancy = if hub.category == Category::Start && turn == 0 {
                    network.nb_drones()
                } else {
                    0
                };
                let node = graph.add_node(TimeNode {
                    hub: hub_id,
                    turn,
                    zone: hub.zone,
                    is_end: hub.category == Category::End,
                    max_drones: hub.max_drones,
                    occupancy,
                });
                lookup.insert((hub_id, turn), node);
            }
        }
        for turn in 0..horizon {
            // Movement edges, in the directed-link order of the static graph. Blocked hubs
            // have no links, so no edge can touch them.
            for link in network.graph().edge_references() {
                let arrival = turn + link.weight().cost;
                if arrival > horizon {
                    continue;
                }
                let source = lookup[&(link.source(), turn)];
                let target = lookup[&(link.target(), arrival)];
                graph.add_edge(
                    source,
                    target,
                    TimeEdge {
                        duration: link.weight().cost,
                        capacity: link.weight().capacity,
                    },
                );
            }
            // Wait edges.
            for (hub_id, hub) in network.hubs() {
                if hub.zone == Zone::Blocked {
                    continue;
                }
                let source = lookup[&(hub_id, turn)];
                let target = lookup[&(hub_id, turn + 1)];
                graph.add_edge(
                    source,
                    target,
                    TimeEdge {
                        duration: 1,
                        capacity: hub.max_drones,
                    },
                );
            }
        }
        let start = lookup[&(network.start(), 0)];
        TimeGraph {
            graph,
            lookup,
            horizon,
            start,
        }
    }

    /// Returns a reference to the underlying graph.
    pub const fn graph(&self) -> &DiGraph<TimeNode, TimeEdge> {
        &self.graph
    }

    /// Returns the largest turn index represented in the graph.
    pub const fn horizon(&self) -> Turn {
        self.horizon
    }

    /// Returns the time node of the start hub at turn 0.
    pub const fn start_node(&self) -> NodeIndex {
        self.start
    }

    /// Returns the time node of `hub` at `turn`, if it exists.
    pub fn node_at(&self, hub: NodeIndex, turn: Turn) -> Option<NodeIndex> {
        self.lookup.get(&(hub, turn)).copied()
    }

    /// Returns the data of a time node.
    pub fn node(&self, id: NodeIndex) -> &TimeNode {
        &self.graph[id]
    }

    /// Commits one more drone to be present at `id`. Callers check [TimeNode::can_enter]
    /// first.
    pub(crate) fn add_occupant(&mut self, id: NodeIndex) {
        self.graph[id].occupancy += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Connection, Hub};

    fn get_network() -> Network {
        let hubs = vec![
            Hub::new("start", Category::Start, Zone::Normal, 0, 0, 2),
            Hub::new("ctrl", Category::Intermediate, Zone::Restricted, 1, 0, 1),
            Hub::new("wall", Category::Intermediate, Zone::Blocked, 1, 1, 1),
            Hub::new("goal", Category::End, Zone::Normal, 2, 0, 2),
        ];
        let connections = vec![
            Connection::new("start", "ctrl", 2),
            Connection::new("start", "wall", 1),
            Connection::new("ctrl", "goal", 1),
            Connection::new("wall", "goal", 1),
        ];
        Network::new(2, hubs, connections).unwrap()
    }

    #[test]
    fn blocked_hubs_are_absent() {
        let network = get_network();
        let time_graph = TimeGraph::new(&network, 4);
        let wall = network.hub_index("wall").unwrap();
        for turn in 0..=4 {
            assert_eq!(time_graph.node_at(wall, turn), None);
        }
        // 3 non-blocked hubs over 5 turns.
        assert_eq!(time_graph.graph().node_count(), 15);
    }

    #[test]
    fn start_node_holds_the_fleet() {
        let network = get_network();
        let time_graph = TimeGraph::new(&network, 4);
        let start = time_graph.start_node();
        assert_eq!(time_graph.node(start).occupancy, 2);
        let later = time_graph.node_at(network.start(), 1).unwrap();
        assert_eq!(time_graph.node(later).occupancy, 0);
    }

    #[test]
    fn restricted_moves_span_two_turns() {
        let network = get_network();
        let time_graph = TimeGraph::new(&network, 4);
        let start = network.start();
        let ctrl = network.hub_index("ctrl").unwrap();
        let source = time_graph.node_at(start, 0).unwrap();
        let target = time_graph.node_at(ctrl, 2).unwrap();
        let edge = time_graph.graph().find_edge(source, target).unwrap();
        assert_eq!(time_graph.graph()[edge].duration, 2);
        assert_eq!(time_graph.graph()[edge].capacity, 2);
        // No one-turn entry into the restricted hub.
        let one_turn = time_graph.node_at(ctrl, 1).unwrap();
        assert!(time_graph.graph().find_edge(source, one_turn).is_none());
    }

    #[test]
    fn wait_edges_use_the_hub_capacity() {
        let network = get_network();
        let time_graph = TimeGraph::new(&network, 4);
        let start = network.start();
        let source = time_graph.node_at(start, 0).unwrap();
        let target = time_graph.node_at(start, 1).unwrap();
        let edge = time_graph.graph().find_edge(source, target).unwrap();
        assert_eq!(time_graph.graph()[edge].duration, 1);
        assert_eq!(time_graph.graph()[edge].capacity, 2);
    }

    #[test]
    fn no_edge_crosses_the_horizon() {
        let network = get_network();
        let time_graph = TimeGraph::new(&network, 3);
        for edge in time_graph.graph().edge_references() {
            let source = time_graph.node(edge.source());
            let target = time_graph.node(edge.target());
            assert!(target.turn <= 3);
            assert_eq!(target.turn - source.turn, edge.weight().duration);
            assert!(edge.weight().duration == 1 || edge.weight().duration == 2);
        }
    }
}
