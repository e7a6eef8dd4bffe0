//! Shortest-route search for a single drone over the time-expanded graph.
use std::cmp::Reverse;

use hashbrown::{HashMap, HashSet};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use priority_queue::PriorityQueue;

use crate::network::Turn;
use crate::reservation::ReservationTracker;
use crate::time_graph::TimeGraph;

/// Queue key: earlier arrival first, then more priority hubs, then insertion order.
///
/// The derived ordering compares the fields lexicographically. `priority` is stored reversed so
/// that a larger count sorts first, and `seq` makes the ordering total: entries with equal cost
/// pop in insertion order, never in an order depending on how nodes hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchKey {
    turn: Turn,
    priority: Reverse<u32>,
    seq: u64,
}

/// Best-known cost of a partial route to a node.
#[derive(Clone, Copy, Debug)]
struct Label {
    turn: Turn,
    priority: u32,
}

impl Label {
    /// Returns true if this label is strictly better than `other`: it arrives earlier, or as
    /// fast while crossing more priority hubs.
    fn improves(&self, other: &Label) -> bool {
        self.turn < other.turn || (self.turn == other.turn && self.priority > other.priority)
    }
}

/// Returns the best route from the start node to the end hub that the current reservations
/// allow, or `None` if no feasible route is left.
///
/// The search is a Dijkstra run over the time-expanded graph that skips transitions without
/// spare capacity. Transition durations are positive, so the first settled end node carries the
/// optimal cost.
pub fn shortest_route(
    time_graph: &TimeGraph,
    tracker: &ReservationTracker,
) -> Option<Vec<NodeIndex>> {
    let graph = time_graph.graph();
    let start = time_graph.start_node();

    let mut seq: u64 = 0;
    let mut best: HashMap<NodeIndex, Label> = HashMap::new();
    let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut settled: HashSet<NodeIndex> = HashSet::new();
    let mut queue: PriorityQueue<NodeIndex, Reverse<SearchKey>> = PriorityQueue::new();

    // A priority zone on the start hub counts as crossed at turn 0.
    let start_label = Label {
        turn: 0,
        priority: u32::from(graph[start].is_priority()),
    };
    best.insert(start, start_label);
    queue.push(
        start,
        Reverse(SearchKey {
            turn: start_label.turn,
            priority: Reverse(start_label.priority),
            seq,
        }),
    );

    while let Some((node, _)) = queue.pop() {
        settled.insert(node);
        let node_data = &graph[node];
        if node_data.is_end {
            return Some(reconstruct(&parents, node));
        }
        let label = best[&node];
        for edge in graph.edges(node) {
            let next = edge.target();
            if settled.contains(&next) {
                continue;
            }
            if !tracker.is_traversable(edge.id(), node_data.turn, edge.weight()) {
                continue;
            }
            let next_data = &graph[next];
            // The start node at turn 0 is exempt from the entry check: it is pre-loaded with
            // the whole fleet. No transition flies back in time, so nothing targets it anyway.
            if next != start && !next_data.can_enter() {
                continue;
            }
            let candidate = Label {
                turn: label.turn + edge.weight().duration,
                priority: label.priority + u32::from(next_data.is_priority()),
            };
            debug_assert_eq!(candidate.turn, next_data.turn);
            if best
                .get(&next)
                .map_or(true, |current| candidate.improves(current))
            {
                seq += 1;
                best.insert(next, candidate);
                parents.insert(next, node);
                queue.push_increase(
                    next,
                    Reverse(SearchKey {
                        turn: candidate.turn,
                        priority: Reverse(candidate.priority),
                        seq,
                    }),
                );
            }
        }
    }
    None
}

/// Walks the predecessor map back from `end` and returns the route in travel order.
fn reconstruct(parents: &HashMap<NodeIndex, NodeIndex>, end: NodeIndex) -> Vec<NodeIndex> {
    let mut route = vec![end];
    let mut current = end;
    while let Some(&parent) = parents.get(&current) {
        route.push(parent);
        current = parent;
    }
    route.reverse();
    route
}
