//! Shortest-path search over the compacted graph

use std::{cmp::Ordering, collections::BinaryHeap};

use geo::Coord;
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{CompactSegment, RoadNode};

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    /// Insertion counter; equal costs settle in discovery order, making the
    /// search deterministic.
    order: u64,
    node: NodeIndex,
}

impl Eq for State {}

// Min-heap by cost (reversed from standard Rust BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edge types a plain-weight search can run over.
pub trait EdgeWeight {
    fn cost(&self) -> f64;
}

impl EdgeWeight for crate::model::SegmentWeight {
    fn cost(&self) -> f64 {
        self.weight
    }
}

impl EdgeWeight for CompactSegment {
    fn cost(&self) -> f64 {
        self.weight
    }
}

/// Dijkstra's algorithm returning settled costs only.
///
/// Infinite edges are excluded from consideration. With a target, the
/// search stops once the target is settled; without one it exhausts the
/// reachable component.
pub fn path_weights<E: EdgeWeight>(
    graph: &DiGraph<RoadNode, E>,
    start: NodeIndex,
    target: Option<NodeIndex>,
) -> HashMap<NodeIndex, f64> {
    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut order = 0u64;

    heap.push(State {
        cost: 0.0,
        order,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        if target == Some(node) {
            break;
        }

        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let edge_cost = edge.weight().cost();
            if !edge_cost.is_finite() {
                continue;
            }
            let next = edge.target();
            let next_cost = cost + edge_cost;
            order += 1;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        order,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            order,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

/// A found path: the concatenated source polyline and its total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub path: Vec<Coord<f64>>,
    pub weight: f64,
}

/// Dijkstra's algorithm over the compacted graph with path reconstruction.
///
/// Returns `None` when `target` is unreachable from `source`. The polyline
/// concatenates the compacted edges' geometries with joint vertices
/// deduplicated, so intermediate pass-through coordinates reappear in the
/// result even though the search never visits them.
pub fn shortest_path(
    graph: &DiGraph<RoadNode, CompactSegment>,
    source: NodeIndex,
    target: NodeIndex,
) -> Option<PathResult> {
    if source == target {
        let point = graph.node_weight(source)?.geometry;
        return Some(PathResult {
            path: vec![point.into()],
            weight: 0.0,
        });
    }

    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, EdgeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut order = 0u64;

    heap.push(State {
        cost: 0.0,
        order,
        node: source,
    });
    distances.insert(source, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        if node == target {
            break;
        }
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let edge_cost = edge.weight().cost();
            if !edge_cost.is_finite() {
                continue;
            }
            let next = edge.target();
            let next_cost = cost + edge_cost;
            order += 1;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    predecessors.insert(next, edge.id());
                    heap.push(State {
                        cost: next_cost,
                        order,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        predecessors.insert(next, edge.id());
                        heap.push(State {
                            cost: next_cost,
                            order,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    let weight = *distances.get(&target)?;
    if !predecessors.contains_key(&target) {
        return None;
    }

    // Walk predecessor edges backward, then emit their polylines forward.
    let mut edges = Vec::new();
    let mut current = target;
    while current != source {
        let edge = predecessors[&current];
        edges.push(edge);
        let (from, _) = graph.edge_endpoints(edge)?;
        current = from;
    }
    edges.reverse();

    let mut path: Vec<Coord<f64>> = vec![graph.node_weight(source)?.geometry.into()];
    for edge in edges {
        let geometry = &graph[edge].geometry;
        path.extend_from_slice(&geometry[1..]);
    }

    Some(PathResult { path, weight })
}
