//! Shortest-path search and route orchestration

pub mod candidates;
pub mod dijkstra;
pub mod router;
pub mod session;

pub use dijkstra::{PathResult, path_weights, shortest_path};
pub use router::{Leg, RouteResult, RouteSummary, Router, RouterOptions};
pub use session::RouteSession;
