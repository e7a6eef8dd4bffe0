//! Tracking of the link capacity consumed by committed routes.
use hashbrown::HashMap;
use petgraph::graph::EdgeIndex;

use crate::network::Turn;
use crate::time_graph::TimeEdge;

/// Per-edge, per-turn occupancy counters for the time-expanded graph.
///
/// A transition of duration 2 consumes its edge during both turns, so capacity is checked and
/// reserved over the whole `[entry, entry + duration)` interval, never at the entry turn alone.
#[derive(Clone, Debug, Default)]
pub struct ReservationTracker {
    edge_use: HashMap<(EdgeIndex, Turn), u32>,
}

impl ReservationTracker {
    /// Returns the number of drones committed to `edge` at `turn`.
    pub fn occupied(&self, edge: EdgeIndex, turn: Turn) -> u32 {
        self.edge_use.get(&(edge, turn)).copied().unwrap_or(0)
    }

    /// Returns true if `edge`, entered at `entry`, has spare capacity on every turn of its
    /// duration.
    pub fn is_traversable(&self, edge: EdgeIndex, entry: Turn, data: &TimeEdge) -> bool {
        (entry..entry + data.duration).all(|turn| self.occupied(edge, turn) < data.capacity)
    }

    /// Commits one drone to `edge` for every turn of its duration.
    pub fn reserve(&mut self, edge: EdgeIndex, entry: Turn, data: &TimeEdge) {
        for turn in entry..entry + data.duration {
            *self.edge_use.entry((edge, turn)).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_covers_the_whole_duration() {
        let mut tracker = ReservationTracker::default();
        let edge = EdgeIndex::new(0);
        let data = TimeEdge {
            duration: 2,
            capacity: 1,
        };
        assert!(tracker.is_traversable(edge, 3, &data));
        tracker.reserve(edge, 3, &data);
        assert_eq!(tracker.occupied(edge, 3), 1);
        assert_eq!(tracker.occupied(edge, 4), 1);
        assert_eq!(tracker.occupied(edge, 5), 0);
        assert!(!tracker.is_traversable(edge, 3, &data));
    }

    #[test]
    fn full_on_either_turn_blocks_the_edge() {
        let mut tracker = ReservationTracker::default();
        let edge = EdgeIndex::new(7);
        let data = TimeEdge {
            duration: 2,
            capacity: 2,
        };
        tracker.reserve(edge, 0, &data);
        tracker.reserve(edge, 1, &data);
        // Turn 1 now holds 2 drones, so an entry at turn 0 or 1 must be refused even though
        // turns 0 and 2 have spare capacity.
        assert_eq!(tracker.occupied(edge, 1), 2);
        assert!(!tracker.is_traversable(edge, 0, &data));
        assert!(!tracker.is_traversable(edge, 1, &data));
        assert!(tracker.is_traversable(edge, 2, &data));
    }

    #[test]
    fn distinct_edges_do_not_interact() {
        let mut tracker = ReservationTracker::default();
        let data = TimeEdge {
            duration: 1,
            capacity: 1,
        };
        tracker.reserve(EdgeIndex::new(0), 0, &data);
        assert!(tracker.is_traversable(EdgeIndex::new(1), 0, &data));
    }
}
