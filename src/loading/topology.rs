//! Topology extraction from line geometries
//!
//! Merges near-duplicate endpoints into a single vertex identity by rounding
//! coordinates to the precision implied by the tolerance, and emits one
//! directed edge record per consecutive coordinate pair. No weighting
//! happens here.

use geo::Coord;
use hashbrown::HashMap;
use log::{debug, info};
use std::sync::Arc;

use super::geojson::{LineFeature, WayTags};

/// Default vertex-merge tolerance in geographic degrees.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Identity of a graph vertex after tolerance rounding.
pub type VertexKey = String;

/// One topological edge: a consecutive coordinate pair of a source line,
/// keyed by its endpoint vertices and carrying the source feature's tags.
#[derive(Debug, Clone)]
pub struct TopologyEdge {
    pub from: VertexKey,
    pub to: VertexKey,
    pub tags: Arc<WayTags>,
}

/// Vertex/edge skeleton of the network before weighting.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Representative (unrounded) coordinate per vertex: the first raw
    /// coordinate observed for the key.
    pub vertices: HashMap<VertexKey, Coord<f64>>,
    pub edges: Vec<TopologyEdge>,
    /// Total number of raw coordinates seen across all lines.
    pub source_points: usize,
}

/// Rounds a coordinate to the decimal precision implied by `tolerance`.
fn round_coord(c: Coord<f64>, tolerance: f64) -> Coord<f64> {
    let precision = (-tolerance.log10()).round();
    let factor = 10f64.powf(precision);
    // The `+ 0.0` folds IEEE negative zero into positive zero so that keys
    // on either side of the origin agree.
    Coord {
        x: (c.x * factor).round() / factor + 0.0,
        y: (c.y * factor).round() / factor + 0.0,
    }
}

/// Vertex identity for a coordinate under the given tolerance.
///
/// Pure function of `(c, tolerance)`: coordinates rounding to the same cell
/// share a key.
pub fn vertex_key(c: Coord<f64>, tolerance: f64) -> VertexKey {
    let rounded = round_coord(c, tolerance);
    format!("{},{}", rounded.x, rounded.y)
}

/// Builds the topology of a line-feature collection.
///
/// Every line with at least two coordinates contributes one edge per
/// consecutive pair; shorter lines are skipped. Self-intersecting lines
/// share vertices naturally through key collisions.
pub fn build_topology(features: &[LineFeature], tolerance: f64) -> Topology {
    let mut topology = Topology::default();

    for feature in features {
        if feature.coords.len() < 2 {
            debug!("Skipping line with {} coordinates", feature.coords.len());
            continue;
        }

        topology.source_points += feature.coords.len();

        let mut previous: Option<VertexKey> = None;
        for &coord in &feature.coords {
            let key = vertex_key(coord, tolerance);
            topology.vertices.entry(key.clone()).or_insert(coord);

            if let Some(from) = previous {
                topology.edges.push(TopologyEdge {
                    from,
                    to: key.clone(),
                    tags: Arc::clone(&feature.tags),
                });
            }
            previous = Some(key);
        }
    }

    info!(
        "Topology: {} vertices, {} edges from {} source points",
        topology.vertices.len(),
        topology.edges.len(),
        topology.source_points
    );

    topology
}
