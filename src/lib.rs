//! Road-network pathfinding engine.
//!
//! Turns a collection of line geometries with OSM-style tags into a
//! weighted directed graph, compacts pass-through chains while preserving
//! shortest-path distances, and routes between arbitrary waypoints with
//! multi-candidate snapping.
//!
//! The pipeline runs strictly downward:
//!
//! ```text
//! line features -> topology -> weighted graph -> compacted graph -> routes
//! ```
//!
//! The [`routing::Router`] is the public entry point: it owns the built
//! model and the speed table, and answers `route()` requests over `&self`.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::Error;

/// Snap candidates ranked per waypoint.
pub const MAX_SNAP_CANDIDATES: usize = 5;

/// Cap on candidate combinations tried per route request.
pub const MAX_ROUTE_COMBINATIONS: usize = 50;
