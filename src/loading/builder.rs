//! Graph assembly and the full build pipeline
//!
//! Applies the weight model to a topology, producing the full directed
//! graph (impassable directions kept as infinite weight), compacts it, and
//! wraps everything into an immutable [`RoadModel`].

use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use rstar::RTree;

use super::compact::compact_graph;
use super::config::GraphConfig;
use super::geojson::LineFeature;
use super::topology::{Topology, VertexKey, build_topology};
use super::weights::{HighwaySpeeds, edge_cost, segment_length_m};
use crate::Error;
use crate::model::{IndexedPoint, NetworkSummary, RoadModel, RoadNode, SegmentWeight};

fn ensure_node(
    graph: &mut DiGraph<RoadNode, SegmentWeight>,
    node_ids: &mut HashMap<VertexKey, NodeIndex>,
    topology: &Topology,
    key: &VertexKey,
) -> NodeIndex {
    if let Some(&node) = node_ids.get(key) {
        return node;
    }
    let node = graph.add_node(RoadNode {
        key: key.clone(),
        geometry: Point::from(topology.vertices[key]),
    });
    node_ids.insert(key.clone(), node);
    node
}

/// Applies the weight model to every topological edge and inserts both
/// directions into the full graph.
///
/// A repeated segment between the same vertex pair overwrites the earlier
/// one (adjacency-map semantics). Weight computation is a parallel map over
/// the edge list; insertion stays sequential and deterministic.
pub fn assemble_graph(
    topology: &Topology,
    speeds: &HighwaySpeeds,
    config: &GraphConfig,
) -> (
    DiGraph<RoadNode, SegmentWeight>,
    HashMap<VertexKey, NodeIndex>,
    HashSet<String>,
) {
    let costs: Vec<_> = topology
        .edges
        .par_iter()
        .map(|edge| {
            edge_cost(
                topology.vertices[&edge.from],
                topology.vertices[&edge.to],
                &edge.tags,
                speeds,
            )
        })
        .collect();

    let mut graph = DiGraph::with_capacity(topology.vertices.len(), topology.edges.len() * 2);
    let mut node_ids = HashMap::with_capacity(topology.vertices.len());
    let mut unknown_classes = HashSet::new();

    for (edge, (cost, unknown)) in topology.edges.iter().zip(costs) {
        if let Some(class) = unknown {
            if unknown_classes.insert(class.clone()) {
                warn!("Unknown highway classification {class:?}, treating as impassable");
            }
        }

        let a = ensure_node(&mut graph, &mut node_ids, topology, &edge.from);
        let b = ensure_node(&mut graph, &mut node_ids, topology, &edge.to);

        let data = config.edge_seed.as_ref().map(|seed| seed(&edge.tags));
        graph.update_edge(a, b, SegmentWeight {
            weight: cost.forward.unwrap_or(f64::INFINITY),
            data: data.clone(),
        });
        graph.update_edge(b, a, SegmentWeight {
            weight: cost.backward.unwrap_or(f64::INFINITY),
            data,
        });
    }

    (graph, node_ids, unknown_classes)
}

/// Builds a complete model from an already-extracted topology.
///
/// Used both for the initial build and for weight rebuilds after a speed
/// table change, which reuse the retained topology.
pub(crate) fn model_from_topology(
    topology: Topology,
    speeds: &HighwaySpeeds,
    config: &GraphConfig,
) -> RoadModel {
    let (graph, node_ids, unknown_classes) = assemble_graph(&topology, speeds, config);
    let (compact, compact_ids) = compact_graph(&graph, config.edge_reducer.as_ref());

    let total_length_km = topology
        .edges
        .par_iter()
        .map(|edge| segment_length_m(topology.vertices[&edge.from], topology.vertices[&edge.to]))
        .sum::<f64>()
        / 1000.0;

    let summary = NetworkSummary {
        vertex_count: graph.node_count(),
        edge_count: graph.edge_count(),
        total_length_km,
        source_point_count: topology.source_points,
    };

    let snap_index = RTree::bulk_load(
        compact
            .node_indices()
            .map(|node| IndexedPoint {
                geometry: compact[node].geometry,
                node,
            })
            .collect(),
    );

    info!(
        "Road model: {} vertices, {} directed edges, {:.2} km of network",
        summary.vertex_count, summary.edge_count, summary.total_length_km
    );

    RoadModel {
        graph,
        node_ids,
        compact,
        compact_ids,
        summary,
        unknown_classes,
        topology,
        snap_index,
    }
}

/// Builds a road model from line features.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the features yield no routable segments.
pub fn build_road_model(features: &[LineFeature], config: &GraphConfig) -> Result<RoadModel, Error> {
    let topology = build_topology(features, config.tolerance);
    if topology.edges.is_empty() {
        return Err(Error::Parse(
            "network contains no routable segments".to_string(),
        ));
    }
    Ok(model_from_topology(topology, &config.speeds, config))
}
