//! Road graph components - vertices and the two edge flavours

use geo::{Coord, Point};

use crate::loading::EdgeData;
use crate::loading::topology::VertexKey;

/// Road graph vertex
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// Rounded-coordinate identity of the vertex
    pub key: VertexKey,
    /// Representative source coordinate, stored unrounded
    pub geometry: Point<f64>,
}

/// Full-graph edge: one directed traversal of a single segment.
///
/// Impassable directions carry `f64::INFINITY` rather than being dropped,
/// so the compactor sees every segment; infinite edges are discarded after
/// compaction.
#[derive(Debug, Clone)]
pub struct SegmentWeight {
    /// Traversal cost in seconds, or `f64::INFINITY`
    pub weight: f64,
    pub data: Option<EdgeData>,
}

/// Compacted-graph edge: a collapsed chain of pass-through vertices.
#[derive(Debug, Clone)]
pub struct CompactSegment {
    /// Summed traversal cost of the chain in seconds
    pub weight: f64,
    /// Full ordered polyline including both endpoint coordinates
    pub geometry: Vec<Coord<f64>>,
    pub data: Option<EdgeData>,
}
