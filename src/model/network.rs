//! Built road model: full graph, compacted graph, and spatial index

use geo::Point;
use hashbrown::{HashMap, HashSet};
use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::Serialize;

use super::components::{CompactSegment, RoadNode, SegmentWeight};
use crate::loading::topology::{Topology, VertexKey};

/// Entry in the snapping index: a compacted-graph vertex at its
/// representative coordinate.
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub geometry: Point<f64>,
    pub node: NodeIndex,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.geometry.x(), self.geometry.y()])
    }
}

impl PointDistance for IndexedPoint {
    /// Squared Euclidean distance in degree space. Candidate ranking only
    /// needs relative order over a local neighbourhood, where this agrees
    /// with geodesic distance.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.geometry.x() - point[0];
        let dy = self.geometry.y() - point[1];
        dx * dx + dy * dy
    }
}

/// Diagnostic build summary for a caller-facing info panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetworkSummary {
    /// Vertices in the full graph
    pub vertex_count: usize,
    /// Directed edges in the full graph
    pub edge_count: usize,
    /// Total geodesic length of all segments in kilometres
    pub total_length_km: f64,
    /// Raw coordinates in the source lines
    pub source_point_count: usize,
}

/// Immutable routing model built once per loaded network.
///
/// Queries only borrow the model; rebuilding (new network, changed speed
/// table) replaces it wholesale.
pub struct RoadModel {
    /// Full adjacency graph; impassable directions kept as `INFINITY`.
    pub graph: DiGraph<RoadNode, SegmentWeight>,
    pub node_ids: HashMap<VertexKey, NodeIndex>,
    /// Compacted graph with pass-through chains collapsed and infinite
    /// edges dropped.
    pub compact: DiGraph<RoadNode, CompactSegment>,
    pub compact_ids: HashMap<VertexKey, NodeIndex>,
    pub summary: NetworkSummary,
    /// Highway classes without a speed-table entry seen during assembly.
    pub unknown_classes: HashSet<String>,
    /// Retained for weight rebuilds when the speed table changes.
    pub(crate) topology: Topology,
    pub(crate) snap_index: RTree<IndexedPoint>,
}

impl RoadModel {
    /// Up to `k` compacted-graph vertices nearest to `point`, ascending by
    /// straight-line distance.
    pub fn nearest_vertices(&self, point: Point<f64>, k: usize) -> Vec<NodeIndex> {
        self.snap_index
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(k)
            .map(|entry| entry.node)
            .collect()
    }

    /// Representative coordinate of a compacted-graph vertex.
    pub fn compact_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.compact.node_weight(node).map(|n| n.geometry)
    }
}
