//! Graph compaction
//!
//! Collapses chains of pass-through vertices into single edges that carry
//! the summed weight and the full source polyline. Shortest-path distances
//! between the retained (junction / dead-end) vertices are unchanged.
//! Impassable (infinite) edges survive compaction so chains containing them
//! sum to infinity, and are dropped from the output graph afterwards.

use fixedbitset::FixedBitSet;
use geo::Coord;
use hashbrown::{HashMap, HashSet};
use log::info;
use petgraph::Direction::{Incoming, Outgoing};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::loading::{EdgeData, EdgeReducer};
use crate::model::{CompactSegment, RoadNode, SegmentWeight};

/// A vertex is a pure pass-through when every traversal must enter from one
/// neighbour and leave to the other: either the interior of a one-way chain
/// (single distinct predecessor, single distinct successor, not the same
/// vertex) or the interior of a two-way chain (the same two distinct
/// neighbours on both sides). Everything else - junctions, dead ends,
/// vertices with self-loops - is retained.
fn is_pass_through(graph: &DiGraph<RoadNode, SegmentWeight>, node: NodeIndex) -> bool {
    if graph.find_edge(node, node).is_some() {
        return false;
    }

    let ins: HashSet<NodeIndex> = graph.neighbors_directed(node, Incoming).collect();
    let outs: HashSet<NodeIndex> = graph.neighbors_directed(node, Outgoing).collect();

    match (ins.len(), outs.len()) {
        (1, 1) => ins != outs,
        (2, 2) => ins == outs,
        _ => false,
    }
}

/// Compacts the full graph.
///
/// Returns the compacted graph and its key → node lookup. Chains are walked
/// from every retained vertex through consecutive pass-through vertices;
/// parallel chains between the same pair of retained vertices are kept as
/// parallel edges so the cheaper alternative is never lost. A graph with no
/// pass-through vertices comes back structurally unchanged.
pub fn compact_graph(
    graph: &DiGraph<RoadNode, SegmentWeight>,
    reducer: Option<&EdgeReducer>,
) -> (
    DiGraph<RoadNode, CompactSegment>,
    HashMap<String, NodeIndex>,
) {
    let mut pass_through = FixedBitSet::with_capacity(graph.node_count());
    for node in graph.node_indices() {
        if is_pass_through(graph, node) {
            pass_through.insert(node.index());
        }
    }

    let mut compact = DiGraph::with_capacity(
        graph.node_count() - pass_through.count_ones(..),
        graph.edge_count(),
    );
    let mut compact_ids = HashMap::new();
    let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();

    for node in graph.node_indices() {
        if pass_through.contains(node.index()) {
            continue;
        }
        let weight = graph[node].clone();
        let new_node = compact.add_node(weight);
        compact_ids.insert(graph[node].key.clone(), new_node);
        remap.insert(node, new_node);
    }

    let mut dropped = 0usize;
    for start in graph.node_indices() {
        if pass_through.contains(start.index()) {
            continue;
        }

        for first in graph.edges(start) {
            let mut coords: Vec<Coord<f64>> = vec![graph[start].geometry.into()];
            let mut weight = 0.0f64;
            let mut data: Option<EdgeData> = None;

            let mut prev = start;
            let mut edge = first.id();
            let mut cur = first.target();

            let end = loop {
                let segment = &graph[edge];
                weight += segment.weight;
                if let (Some(reduce), Some(d)) = (reducer, &segment.data) {
                    data = Some(reduce(data.take(), d));
                }
                coords.push(graph[cur].geometry.into());

                if !pass_through.contains(cur.index()) {
                    break Some(cur);
                }
                let Some(next) = graph.edges(cur).find(|e| e.target() != prev) else {
                    break None;
                };
                prev = cur;
                edge = next.id();
                cur = next.target();
            };

            let Some(end) = end else { continue };
            if weight.is_finite() {
                compact.add_edge(remap[&start], remap[&end], CompactSegment {
                    weight,
                    geometry: coords,
                    data,
                });
            } else {
                dropped += 1;
            }
        }
    }

    info!(
        "Compacted graph: {} of {} vertices retained, {} edges ({} impassable chains dropped)",
        compact.node_count(),
        graph.node_count(),
        compact.edge_count(),
        dropped
    );

    (compact, compact_ids)
}
