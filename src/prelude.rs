pub use crate::{MAX_ROUTE_COMBINATIONS, MAX_SNAP_CANDIDATES};

// Re-export key components
pub use crate::error::Error;
pub use crate::loading::{
    GraphConfig, HighwaySpeeds, LineFeature, WayTags, build_road_model, line_features,
    line_features_from_str,
};
pub use crate::model::{NetworkSummary, RoadModel};
pub use crate::routing::{
    Leg, PathResult, RouteResult, RouteSession, RouteSummary, Router, RouterOptions,
    shortest_path,
};

// Core identity and tolerance types for the topology stage
pub use crate::loading::topology::{DEFAULT_TOLERANCE, VertexKey};
