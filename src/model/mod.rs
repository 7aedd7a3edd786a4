//! Data model for the road routing graph

pub mod components;
pub mod network;

pub use components::{CompactSegment, RoadNode, SegmentWeight};
pub use network::{IndexedPoint, NetworkSummary, RoadModel};
