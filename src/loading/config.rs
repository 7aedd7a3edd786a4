use std::sync::Arc;

use crate::loading::geojson::WayTags;
use crate::loading::topology::DEFAULT_TOLERANCE;
use crate::loading::weights::HighwaySpeeds;

/// Opaque per-edge metadata produced by the seed/reducer callbacks.
pub type EdgeData = serde_json::Value;

/// Produces the initial edge data for one inserted direction.
pub type EdgeSeed = Arc<dyn Fn(&WayTags) -> EdgeData + Send + Sync>;

/// Folds the data of consecutive segments of a compacted chain.
pub type EdgeReducer = Arc<dyn Fn(Option<EdgeData>, &EdgeData) -> EdgeData + Send + Sync>;

/// Options for building a road model from line features.
#[derive(Clone)]
pub struct GraphConfig {
    /// Vertex-merge tolerance in geographic degrees.
    pub tolerance: f64,
    /// Initial highway-class speed table.
    pub speeds: HighwaySpeeds,
    /// Optional per-direction edge-data seed.
    pub edge_seed: Option<EdgeSeed>,
    /// Optional reducer accumulating seeded data across compacted chains.
    pub edge_reducer: Option<EdgeReducer>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            speeds: HighwaySpeeds::default(),
            edge_seed: None,
            edge_reducer: None,
        }
    }
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tolerance", &self.tolerance)
            .field("speeds", &self.speeds)
            .field("edge_seed", &self.edge_seed.as_ref().map(|_| "<fn>"))
            .field("edge_reducer", &self.edge_reducer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
