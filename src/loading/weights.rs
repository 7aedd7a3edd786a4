//! Directional traversal costs
//!
//! Converts a segment's geometry and tags into per-direction costs in
//! seconds, using a runtime-replaceable highway-class speed table.

use std::collections::HashMap;

use geo::{Coord, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use super::geojson::WayTags;

/// Calibration factor applied to table speeds (real traffic moves slower
/// than the nominal class speed).
const CALIBRATION_FACTOR: f64 = 0.9;

/// Additional factor for `*_link` ramps and slip roads.
const LINK_FACTOR: f64 = 0.7;

/// Highway classification → speed in km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighwaySpeeds(HashMap<String, f64>);

impl Default for HighwaySpeeds {
    fn default() -> Self {
        let table = [
            ("motorway", 120.0),
            ("trunk", 100.0),
            ("primary", 80.0),
            ("secondary", 60.0),
            ("tertiary", 50.0),
            ("unclassified", 50.0),
            ("road", 50.0),
            ("residential", 30.0),
            ("service", 20.0),
            ("living_street", 10.0),
        ];
        Self(
            table
                .into_iter()
                .map(|(class, speed)| (class.to_string(), speed))
                .collect(),
        )
    }
}

impl HighwaySpeeds {
    pub fn speed(&self, class: &str) -> Option<f64> {
        self.0.get(class).copied()
    }

    pub fn set(&mut self, class: impl Into<String>, kmh: f64) {
        self.0.insert(class.into(), kmh);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(class, &speed)| (class.as_str(), speed))
    }
}

/// Per-direction cost of one segment in seconds; `None` is impassable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeCost {
    pub forward: Option<f64>,
    pub backward: Option<f64>,
}

/// Geodesic length of a segment in metres.
pub(crate) fn segment_length_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

fn travel_seconds(distance_m: f64, speed_kmh: f64) -> Option<f64> {
    (speed_kmh > 0.0).then(|| distance_m / (speed_kmh / 3.6))
}

/// Computes the directional cost of a segment.
///
/// An explicit numeric `maxspeed` overrides the table and the calibration
/// factor. Otherwise the highway class is looked up with the calibration
/// factor applied, stripping a `_link` suffix (with an extra penalty)
/// first. An unknown class makes the segment impassable and is reported in
/// the second tuple element for diagnostics. `oneway` (anything but `no`)
/// and `junction=roundabout` make the backward direction impassable.
pub fn edge_cost(
    a: Coord<f64>,
    b: Coord<f64>,
    tags: &WayTags,
    speeds: &HighwaySpeeds,
) -> (EdgeCost, Option<String>) {
    let distance = segment_length_m(a, b);
    let mut unknown = None;

    let speed = match tags.maxspeed.as_deref().and_then(|v| v.parse::<f64>().ok()) {
        Some(maxspeed) => Some(maxspeed),
        None => {
            let mut class = tags.highway.as_deref().unwrap_or("");
            let mut factor = CALIBRATION_FACTOR;
            if let Some(stripped) = class.strip_suffix("_link") {
                class = stripped;
                factor *= LINK_FACTOR;
            }

            let class_speed = speeds.speed(class).map(|kmh| kmh * factor);
            if class_speed.is_none() {
                unknown = Some(class.to_string());
            }
            class_speed
        }
    };

    let forward = speed.and_then(|kmh| travel_seconds(distance, kmh));

    let oneway = tags.oneway.as_deref().is_some_and(|v| v != "no")
        || tags.junction.as_deref() == Some("roundabout");
    let backward = if oneway { None } else { forward };

    (EdgeCost { forward, backward }, unknown)
}
