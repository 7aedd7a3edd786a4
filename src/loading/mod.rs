//! This module is responsible for turning line-feature input into a routing
//! model: topology extraction, weighting, graph assembly, and compaction.

mod builder;
mod compact;
mod config;
pub mod geojson;
pub mod topology;
pub mod weights;

pub(crate) use builder::model_from_topology;
pub use builder::{assemble_graph, build_road_model};
pub use compact::compact_graph;
pub use config::{EdgeData, EdgeReducer, EdgeSeed, GraphConfig};
pub use geojson::{LineFeature, WayTags, line_features, line_features_from_str};
pub use topology::{DEFAULT_TOLERANCE, Topology, TopologyEdge, VertexKey, build_topology, vertex_key};
pub use weights::{EdgeCost, HighwaySpeeds, edge_cost};
