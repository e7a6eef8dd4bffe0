//! The static network of hubs and connections on which the drones are routed.
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use hashbrown::{HashMap, HashSet};
use petgraph::algo::{dijkstra, has_path_connecting};
use petgraph::graph::{DiGraph, NodeIndex};

/// A discrete, non-negative time index starting at 0.
pub type Turn = u32;

/// Classification of the airspace around a hub.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Zone {
    /// Regular airspace, entered in one turn.
    #[default]
    Normal,
    /// No-fly airspace, excluded from all graph operations.
    Blocked,
    /// Controlled airspace, entered in two turns.
    Restricted,
    /// Airspace that drones favor when several routes are equally fast.
    Priority,
}

impl FromStr for Zone {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Zone::Normal),
            "blocked" => Ok(Zone::Blocked),
            "restricted" => Ok(Zone::Restricted),
            "priority" => Ok(Zone::Priority),
            _ => Err(anyhow!("unknown zone `{s}`")),
        }
    }
}

/// Role of a hub in the routing problem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Category {
    /// The hub where the whole fleet is parked before the first turn.
    Start,
    /// The hub the whole fleet must be delivered to.
    End,
    #[default]
    Intermediate,
}

/// A physical location that drones can fly to and idle at.
#[derive(Clone, Debug)]
pub struct Hub {
    pub name: String,
    pub category: Category,
    pub zone: Zone,
    pub x: u32,
    pub y: u32,
    /// Maximum number of drones that can occupy the hub during the same turn.
    pub max_drones: u32,
}

impl Hub {
    /// Creates a new Hub.
    pub fn new(name: &str, category: Category, zone: Zone, x: u32, y: u32, max_drones: u32) -> Self {
        Hub {
            name: name.to_owned(),
            category,
            zone,
            x,
            y,
            max_drones,
        }
    }

    /// Returns the number of turns a drone needs to fly into this hub.
    pub fn traversal_cost(&self) -> Turn {
        if self.zone == Zone::Restricted {
            2
        } else {
            1
        }
    }
}

/// An undirected link between two hubs, as described in the map.
#[derive(Clone, Debug)]
pub struct Connection {
    pub a: String,
    pub b: String,
    /// Maximum number of drones that can fly the link, per direction, during the same turn.
    pub capacity: u32,
}

impl Connection {
    /// Creates a new Connection.
    pub fn new(a: &str, b: &str, capacity: u32) -> Self {
        Connection {
            a: a.to_owned(),
            b: b.to_owned(),
            capacity,
        }
    }
}

/// Directed edge data of the static graph.
///
/// Each undirected connection of the map yields two directed links, one per flight direction,
/// so that the traversal cost of the target hub can be attached to the link itself.
#[derive(Clone, Copy, Debug)]
pub struct Link {
    /// Simultaneity capacity inherited from the connection.
    pub capacity: u32,
    /// Number of turns needed to reach the target hub.
    pub cost: Turn,
}

/// The static map to route the fleet over.
///
/// A network is composed of the following items:
///
/// - The size of the drone fleet.
/// - A set of [Hub]s, stored in definition order, with exactly one start and one end hub.
/// - A directed graph with two [Link]s per undirected map connection. Blocked hubs keep their
///   index but are connected to nothing.
///
/// The network is immutable once built; all routing state lives in derived structures.
#[derive(Clone, Debug)]
pub struct Network {
    nb_drones: u32,
    graph: DiGraph<Hub, Link>,
    hub_ids: HashMap<String, NodeIndex>,
    nb_connections: usize,
    start: NodeIndex,
    end: NodeIndex,
}

impl Network {
    /// Creates a new Network from the fleet size, the hubs in definition order and the
    /// undirected connections.
    ///
    /// Returns an error if the input violates the map invariants: duplicate names,
    /// coordinates or connections, dangling connection endpoints, missing or duplicated
    /// start / end hubs, or a start / end hub that cannot hold the whole fleet.
    pub fn new(nb_drones: u32, hubs: Vec<Hub>, connections: Vec<Connection>) -> Result<Self> {
        if nb_drones == 0 {
            bail!("the fleet must contain at least one drone");
        }
        let mut graph = DiGraph::with_capacity(hubs.len(), 2 * connections.len());
        let mut hub_ids = HashMap::with_capacity(hubs.len());
        let mut coordinates = HashSet::with_capacity(hubs.len());
        let mut start = None;
        let mut end = None;
        for hub in hubs {
            if hub.name.is_empty()
                || hub.name.contains(char::is_whitespace)
                || hub.name.contains('-')
            {
                bail!(
                    "invalid hub name `{}`: names cannot be empty or contain whitespace or `-`",
                    hub.name
                );
            }
            if hub.max_drones == 0 {
                bail!("hub `{}` must accept at least one drone", hub.name);
            }
            if !coordinates.insert((hub.x, hub.y)) {
                bail!("two hubs share the coordinates ({}, {})", hub.x, hub.y);
            }
            match hub.category {
                Category::Start if start.is_some() => {
                    bail!("the map defines more than one start hub")
                }
                Category::End if end.is_some() => bail!("the map defines more than one end hub"),
                _ => {}
            }
            let name = hub.name.clone();
            let category = hub.category;
            let id = graph.add_node(hub);
            if hub_ids.insert(name.clone(), id).is_some() {
                bail!("hub name `{name}` is duplicated");
            }
            match category {
                Category::Start => start = Some(id),
                Category::End => end = Some(id),
                Category::Intermediate => {}
            }
        }
        let start = start.ok_or_else(|| anyhow!("the map is missing a start hub"))?;
        let end = end.ok_or_else(|| anyhow!("the map is missing an end hub"))?;
        for (role, id) in [("start", start), ("end", end)] {
            let hub = &graph[id];
            if hub.max_drones < nb_drones {
                bail!(
                    "the {role} hub `{}` must accept the whole fleet ({} < {nb_drones})",
                    hub.name,
                    hub.max_drones
                );
            }
        }
        let mut seen = HashSet::with_capacity(connections.len());
        for connection in &connections {
            let a = *hub_ids
                .get(&connection.a)
                .ok_or_else(|| anyhow!("connection references unknown hub `{}`", connection.a))?;
            let b = *hub_ids
                .get(&connection.b)
                .ok_or_else(|| anyhow!("connection references unknown hub `{}`", connection.b))?;
            if a == b {
                bail!("connection `{}` links a hub to itself", connection.a);
            }
            if connection.capacity == 0 {
                bail!(
                    "connection `{}-{}` must carry at least one drone",
                    connection.a,
                    connection.b
                );
            }
            // Connections are undirected: `a-b` and `b-a` are the same connection.
            if !seen.insert((a.min(b), a.max(b))) {
                bail!(
                    "connection `{}-{}` is duplicated",
                    connection.a,
                    connection.b
                );
            }
            // Blocked hubs are kept out of the graph entirely.
            if graph[a].zone == Zone::Blocked || graph[b].zone == Zone::Blocked {
                continue;
            }
            let to_b = Link {
                capacity: connection.capacity,
                cost: graph[b].traversal_cost(),
            };
            let to_a = Link {
                capacity: connection.capacity,
                cost: graph[a].traversal_cost(),
            };
            graph.add_edge(a, b, to_b);
            graph.add_edge(b, a, to_a);
        }
        Ok(Network {
            nb_drones,
            graph,
            hub_ids,
            nb_connections: connections.len(),
            start,
            end,
        })
    }

    /// Returns the number of drones to route.
    pub const fn nb_drones(&self) -> u32 {
        self.nb_drones
    }

    /// Returns the number of hubs, including blocked ones.
    pub fn hub_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of undirected connections described by the map.
    pub const fn nb_connections(&self) -> usize {
        self.nb_connections
    }

    /// Returns a reference to the static graph of the network.
    pub const fn graph(&self) -> &DiGraph<Hub, Link> {
        &self.graph
    }

    /// Returns an iterator over the hubs, in definition order.
    pub fn hubs(&self) -> impl Iterator<Item = (NodeIndex, &Hub)> + '_ {
        self.graph.node_indices().map(|id| (id, &self.graph[id]))
    }

    /// Returns the hub with the given index.
    pub fn hub(&self, id: NodeIndex) -> &Hub {
        &self.graph[id]
    }

    /// Returns the index of the hub with the given name, if any.
    pub fn hub_index(&self, name: &str) -> Option<NodeIndex> {
        self.hub_ids.get(name).copied()
    }

    /// Returns the name of the hub with the given index.
    pub fn hub_name(&self, id: NodeIndex) -> &str {
        &self.graph[id].name
    }

    /// Returns the index of the start hub.
    pub const fn start(&self) -> NodeIndex {
        self.start
    }

    /// Returns the index of the end hub.
    pub const fn end(&self) -> NodeIndex {
        self.end
    }

    /// Returns true if the end hub can be reached from the start hub, ignoring capacities.
    pub fn has_path(&self) -> bool {
        has_path_connecting(&self.graph, self.start, self.end, None)
    }

    /// Returns the minimum number of turns a single drone needs to fly from the start hub to
    /// the end hub, or `None` if the end hub is unreachable.
    ///
    /// Flying into a restricted hub costs 2 turns, into any other hub 1 turn; leaving the
    /// start hub costs nothing.
    pub fn min_path_cost(&self) -> Option<Turn> {
        let costs = dijkstra(&self.graph, self.start, Some(self.end), |edge| {
            edge.weight().cost
        });
        costs.get(&self.end).copied()
    }

    /// Returns the largest turn index the routing has to consider, or `None` if the end hub is
    /// unreachable.
    ///
    /// Even over a bottleneck of capacity 1 the fleet can leave one drone per turn, so
    /// `nb_drones - 1` turns of slack on top of the fastest route are enough for every drone to
    /// get through on the first attempt.
    pub fn horizon(&self) -> Option<Turn> {
        self.min_path_cost().map(|cost| cost + self.nb_drones - 1)
    }
}
