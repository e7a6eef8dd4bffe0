//! Turn-by-turn transcript of the committed routes.
use std::fmt;

use itertools::Itertools;
use petgraph::graph::NodeIndex;

use crate::network::{Network, Turn, Zone};
use crate::time_graph::TimeGraph;

/// A single drone action within one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Movement {
    /// The drone flies a link and arrives on the next turn.
    Hop { drone: u32, to: String },
    /// The drone is flying into a restricted hub; the same record appears on both consumed
    /// turns.
    Transit {
        drone: u32,
        from: String,
        to: String,
    },
}

impl Movement {
    /// Returns the id of the acting drone.
    pub fn drone(&self) -> u32 {
        match self {
            Movement::Hop { drone, .. } | Movement::Transit { drone, .. } => *drone,
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Movement::Hop { drone, to } => write!(f, "D{drone}-{to}"),
            Movement::Transit { drone, from, to } => write!(f, "D{drone}-{from}-{to}"),
        }
    }
}

/// The turn-by-turn movement transcript.
///
/// Each line lists the drones that act during one turn, in drone-id order. Turns where every
/// drone idles produce no line, and a drone stops appearing once it has reached the end hub.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    lines: Vec<Vec<Movement>>,
}

impl Schedule {
    /// Derives the transcript from the committed routes.
    pub fn build(network: &Network, time_graph: &TimeGraph, routes: &[Vec<NodeIndex>]) -> Self {
        let last_turn = routes
            .iter()
            .filter_map(|route| route.last())
            .map(|&node| time_graph.node(node).turn)
            .max()
            .unwrap_or(0);
        let mut delivered = vec![false; routes.len()];
        let mut lines = Vec::new();
        for turn in 0..last_turn {
            let mut records = Vec::new();
            for (index, route) in routes.iter().enumerate() {
                if delivered[index] {
                    continue;
                }
                let drone = index as u32 + 1;
                if let Some(position) = route
                    .iter()
                    .position(|&node| time_graph.node(node).turn == turn)
                {
                    let Some(&next) = route.get(position + 1) else {
                        continue;
                    };
                    let current = time_graph.node(route[position]);
                    let next_data = time_graph.node(next);
                    if next_data.hub == current.hub {
                        // Waiting drones are not reported.
                        continue;
                    }
                    if next_data.zone == Zone::Restricted {
                        records.push(Movement::Transit {
                            drone,
                            from: network.hub_name(current.hub).to_owned(),
                            to: network.hub_name(next_data.hub).to_owned(),
                        });
                    } else {
                        records.push(Movement::Hop {
                            drone,
                            to: network.hub_name(next_data.hub).to_owned(),
                        });
                    }
                    if next_data.is_end {
                        delivered[index] = true;
                    }
                } else if let Some((from, to)) = in_flight(time_graph, route, turn) {
                    // Second turn of a two-turn transit: the drone is still on the link.
                    records.push(Movement::Transit {
                        drone,
                        from: network.hub_name(from).to_owned(),
                        to: network.hub_name(to).to_owned(),
                    });
                }
            }
            if !records.is_empty() {
                lines.push(records);
            }
        }
        Schedule { lines }
    }

    /// Returns the transcript lines, one per turn with at least one acting drone.
    pub fn lines(&self) -> &[Vec<Movement>] {
        &self.lines
    }

    /// Returns true if no drone ever moves.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.iter().join(" "))?;
        }
        Ok(())
    }
}

/// Returns the link endpoints of a drone that is mid-flight at `turn`, if any. This only
/// happens on the second turn of a transit into a restricted hub.
fn in_flight(
    time_graph: &TimeGraph,
    route: &[NodeIndex],
    turn: Turn,
) -> Option<(NodeIndex, NodeIndex)> {
    route
        .iter()
        .copied()
        .tuple_windows()
        .find(|&(source, target)| {
            time_graph.node(source).turn < turn && turn < time_graph.node(target).turn
        })
        .map(|(source, target)| (time_graph.node(source).hub, time_graph.node(target).hub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Category, Connection, Hub};
    use crate::router::solve;

    #[test]
    fn restricted_transit_appears_on_both_turns() {
        let hubs = vec![
            Hub::new("start", Category::Start, Zone::Normal, 0, 0, 1),
            Hub::new("ctrl", Category::Intermediate, Zone::Restricted, 1, 0, 1),
            Hub::new("goal", Category::End, Zone::Normal, 2, 0, 1),
        ];
        let connections = vec![
            Connection::new("start", "ctrl", 1),
            Connection::new("ctrl", "goal", 1),
        ];
        let network = Network::new(1, hubs, connections).unwrap();
        let solution = solve(&network).unwrap();
        assert_eq!(
            solution.schedule.to_string(),
            "D1-start-ctrl\nD1-start-ctrl\nD1-goal\n"
        );
    }

    #[test]
    fn waiting_turns_are_omitted() {
        // One drone, one hub pair: the transcript is a single line.
        let hubs = vec![
            Hub::new("start", Category::Start, Zone::Normal, 0, 0, 1),
            Hub::new("goal", Category::End, Zone::Normal, 1, 0, 1),
        ];
        let connections = vec![Connection::new("start", "goal", 1)];
        let network = Network::new(1, hubs, connections).unwrap();
        let solution = solve(&network).unwrap();
        assert_eq!(solution.schedule.lines().len(), 1);
        assert_eq!(solution.schedule.to_string(), "D1-goal\n");
    }
}
