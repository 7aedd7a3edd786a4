//! Route orchestration
//!
//! Resolves waypoints onto the compacted graph (with multi-candidate
//! fallback), runs the shortest-path search per leg, and assembles the
//! final route with its aggregate statistics.

use std::time::Instant;

use geo::{Coord, Distance, Haversine, LineString, Point};
use geojson::{Feature, Geometry};
use hashbrown::HashSet;
use itertools::Itertools;
use log::debug;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::loading::{
    GraphConfig, HighwaySpeeds, LineFeature, build_road_model, line_features_from_str,
    model_from_topology,
};
use crate::model::{NetworkSummary, RoadModel};
use crate::routing::candidates::{combinations, rank_candidates};
use crate::routing::dijkstra::shortest_path;
use crate::{Error, MAX_ROUTE_COMBINATIONS, MAX_SNAP_CANDIDATES};

/// Tunables for the candidate search.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Snap candidates ranked per waypoint.
    pub max_candidates: usize,
    /// Overall cap on candidate combinations tried per request.
    pub max_combinations: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_candidates: MAX_SNAP_CANDIDATES,
            max_combinations: MAX_ROUTE_COMBINATIONS,
        }
    }
}

/// The path between two consecutive resolved waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub path: Vec<Coord<f64>>,
    /// Travel time in seconds
    pub weight: f64,
}

/// Rounded totals for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSummary {
    /// Metres
    pub total_distance: f64,
    /// Seconds
    pub total_time: f64,
}

/// A computed route with its aggregate statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Concatenated leg polylines, in travel order
    pub coordinates: Vec<Coord<f64>>,
    pub legs: Vec<Leg>,
    /// The graph vertices each waypoint resolved to
    pub snapped_waypoints: Vec<Point<f64>>,
    /// Metres, re-measured from the polylines
    pub total_distance: f64,
    /// Seconds, summed leg weights
    pub total_time: f64,
    /// Polyline points summed per leg
    pub total_nodes: usize,
    /// Wall-clock computation time in milliseconds
    pub calculation_time: f64,
}

impl RouteResult {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            total_distance: self.total_distance.round(),
            total_time: self.total_time.round(),
        }
    }

    /// Exports the route as a GeoJSON feature with summary properties and
    /// the single aggregate instruction.
    pub fn to_geojson(&self) -> Feature {
        let linestring = LineString::from(self.coordinates.clone());
        let summary = self.summary();

        let mut properties = geojson::JsonObject::new();
        properties.insert("totalDistance".to_string(), summary.total_distance.into());
        properties.insert("totalTime".to_string(), summary.total_time.into());
        properties.insert("totalNodes".to_string(), self.total_nodes.into());
        properties.insert(
            "calculationTime".to_string(),
            self.calculation_time.into(),
        );
        properties.insert(
            "instructions".to_string(),
            serde_json::json!([{
                "type": "Straight",
                "text": "Continue to destination",
                "distance": summary.total_distance,
                "time": summary.total_time,
                "index": 0,
            }]),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new((&linestring).into())),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

fn polyline_length_m(path: &[Coord<f64>]) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| Haversine.distance(Point::from(*a), Point::from(*b)))
        .sum()
}

/// Waypoint router over an immutable road model.
///
/// Holds the speed table as explicit owned configuration; mutating it does
/// not touch the built graph until [`rebuild_weights`](Self::rebuild_weights)
/// is called. All route queries take `&self` and may run concurrently.
pub struct Router {
    model: RoadModel,
    speeds: HighwaySpeeds,
    config: GraphConfig,
    options: RouterOptions,
}

impl Router {
    /// Builds the routing graph from line features.
    ///
    /// # Errors
    ///
    /// Returns an error if the features yield no routable network.
    pub fn new(features: &[LineFeature], config: GraphConfig) -> Result<Self, Error> {
        Self::with_options(features, config, RouterOptions::default())
    }

    pub fn with_options(
        features: &[LineFeature],
        config: GraphConfig,
        options: RouterOptions,
    ) -> Result<Self, Error> {
        let model = build_road_model(features, &config)?;
        let speeds = config.speeds.clone();
        Ok(Self {
            model,
            speeds,
            config,
            options,
        })
    }

    /// Parses a GeoJSON document and builds the routing graph from it.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed GeoJSON or an unroutable network.
    pub fn from_geojson_str(geojson: &str, config: GraphConfig) -> Result<Self, Error> {
        let features = line_features_from_str(geojson)?;
        Self::new(&features, config)
    }

    pub fn model(&self) -> &RoadModel {
        &self.model
    }

    pub fn summary(&self) -> NetworkSummary {
        self.model.summary
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    pub fn set_options(&mut self, options: RouterOptions) {
        self.options = options;
    }

    /// Highway classes seen during assembly with no speed-table entry.
    pub fn unknown_classifications(&self) -> &HashSet<String> {
        &self.model.unknown_classes
    }

    pub fn highway_speeds(&self) -> &HighwaySpeeds {
        &self.speeds
    }

    /// Replaces the speed table. Takes effect on the next
    /// [`rebuild_weights`](Self::rebuild_weights).
    pub fn set_highway_speeds(&mut self, speeds: HighwaySpeeds) {
        self.speeds = speeds;
    }

    /// Patches one class in the speed table. Takes effect on the next
    /// [`rebuild_weights`](Self::rebuild_weights).
    pub fn update_highway_speed(&mut self, class: impl Into<String>, kmh: f64) {
        self.speeds.set(class, kmh);
    }

    /// Recomputes weights and compaction from the retained topology with
    /// the current speed table. The new model is built fully before it
    /// replaces the old one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the retained topology has no segments;
    /// the existing model is left untouched in that case.
    pub fn rebuild_weights(&mut self) -> Result<(), Error> {
        if self.model.topology.edges.is_empty() {
            return Err(Error::Parse(
                "network contains no routable segments".to_string(),
            ));
        }
        let topology = self.model.topology.clone();
        self.model = model_from_topology(topology, &self.speeds, &self.config);
        Ok(())
    }

    /// Replaces the network wholesale, rebuilding the graph.
    ///
    /// # Errors
    ///
    /// On error the previously built model is left fully intact.
    pub fn set_network(&mut self, features: &[LineFeature]) -> Result<NetworkSummary, Error> {
        let mut config = self.config.clone();
        config.speeds = self.speeds.clone();
        let model = build_road_model(features, &config)?;
        self.model = model;
        Ok(self.model.summary)
    }

    /// Computes a route through the given waypoints.
    ///
    /// Each waypoint is resolved to its nearest graph vertices; candidate
    /// combinations are tried closest-first until every consecutive leg
    /// connects. Statistics are assembled from the winning combination.
    ///
    /// # Errors
    ///
    /// [`Error::RouteNotFound`] when fewer than two waypoints are given or
    /// no combination connects them all; [`Error::NoPointsFound`] when the
    /// graph has no vertices to snap to.
    pub fn route(&self, waypoints: &[Point<f64>]) -> Result<RouteResult, Error> {
        let started = Instant::now();

        if waypoints.len() < 2 {
            return Err(Error::RouteNotFound);
        }

        let candidate_sets: Vec<Vec<NodeIndex>> = waypoints
            .iter()
            .map(|&waypoint| rank_candidates(&self.model, waypoint, self.options.max_candidates))
            .collect();

        if candidate_sets.iter().any(Vec::is_empty) {
            return Err(Error::NoPointsFound);
        }

        let counts: Vec<usize> = candidate_sets.iter().map(Vec::len).collect();
        for combination in combinations(&counts, self.options.max_combinations) {
            let chosen: Vec<NodeIndex> = combination
                .iter()
                .zip(&candidate_sets)
                .map(|(&candidate, set)| set[candidate])
                .collect();

            if let Some(legs) = self.try_combination(&chosen) {
                debug!("Accepted candidate combination {combination:?}");
                return self.assemble(&chosen, legs, started);
            }
        }

        Err(Error::RouteNotFound)
    }

    /// Attempts every consecutive leg of one candidate combination.
    fn try_combination(&self, chosen: &[NodeIndex]) -> Option<Vec<Leg>> {
        let mut legs = Vec::with_capacity(chosen.len().saturating_sub(1));
        for (&from, &to) in chosen.iter().tuple_windows() {
            let found = shortest_path(&self.model.compact, from, to)?;
            legs.push(Leg {
                path: found.path,
                weight: found.weight,
            });
        }
        Some(legs)
    }

    fn assemble(
        &self,
        chosen: &[NodeIndex],
        legs: Vec<Leg>,
        started: Instant,
    ) -> Result<RouteResult, Error> {
        let snapped_waypoints = chosen
            .iter()
            .map(|&node| {
                self.model.compact_point(node).ok_or_else(|| {
                    Error::InternalRouting("resolved vertex missing from compacted graph".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_time = legs.iter().map(|leg| leg.weight).sum();
        let total_nodes = legs.iter().map(|leg| leg.path.len()).sum();
        let total_distance = legs.iter().map(|leg| polyline_length_m(&leg.path)).sum();
        let coordinates = legs
            .iter()
            .flat_map(|leg| leg.path.iter().copied())
            .collect();

        Ok(RouteResult {
            coordinates,
            legs,
            snapped_waypoints,
            total_distance,
            total_time,
            total_nodes,
            calculation_time: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::WayTags;

    fn feature(coords: &[(f64, f64)], highway: &str) -> LineFeature {
        let tags = WayTags {
            highway: Some(highway.to_string()),
            ..WayTags::default()
        };
        LineFeature::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect(), tags)
    }

    fn residential(coords: &[(f64, f64)]) -> LineFeature {
        feature(coords, "residential")
    }

    /// One straight residential street with an interior pass-through vertex.
    fn street() -> Vec<LineFeature> {
        vec![residential(&[(0.0, 0.0), (0.001, 0.0), (0.002, 0.0)])]
    }

    #[test]
    fn routes_along_a_single_street() {
        let router = Router::new(&street(), GraphConfig::default()).unwrap();
        let route = router
            .route(&[Point::new(0.0, 0.0), Point::new(0.002, 0.0)])
            .unwrap();

        assert_eq!(route.legs.len(), 1);
        // The compacted-away interior vertex reappears in the polyline.
        assert_eq!(route.total_nodes, 3);
        assert_eq!(route.coordinates.len(), 3);
        // Two ~111 m segments along the equator.
        assert!((route.total_distance - 222.4).abs() < 1.0);
        let expected_time = route.total_distance / (30.0 * 0.9 / 3.6);
        assert!((route.total_time - expected_time).abs() < 1e-6);
        assert!(route.calculation_time >= 0.0);
    }

    #[test]
    fn too_few_waypoints_is_route_not_found() {
        let router = Router::new(&street(), GraphConfig::default()).unwrap();
        assert!(matches!(
            router.route(&[Point::new(0.0, 0.0)]),
            Err(Error::RouteNotFound)
        ));
    }

    #[test]
    fn impassable_only_path_is_route_not_found() {
        let features = vec![feature(&[(0.0, 0.0), (0.001, 0.0)], "abandoned")];
        let router = Router::with_options(
            &features,
            GraphConfig::default(),
            RouterOptions {
                max_candidates: 1,
                max_combinations: 50,
            },
        )
        .unwrap();

        assert!(matches!(
            router.route(&[Point::new(0.0, 0.0), Point::new(0.001, 0.0)]),
            Err(Error::RouteNotFound)
        ));
    }

    #[test]
    fn oneway_street_routes_forward_only() {
        let tags = WayTags {
            highway: Some("residential".to_string()),
            oneway: Some("yes".to_string()),
            ..WayTags::default()
        };
        let features = vec![LineFeature::new(
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.001, y: 0.0 }],
            tags,
        )];
        let router = Router::with_options(
            &features,
            GraphConfig::default(),
            RouterOptions {
                max_candidates: 1,
                max_combinations: 50,
            },
        )
        .unwrap();

        let forward = [Point::new(0.0, 0.0), Point::new(0.001, 0.0)];
        let backward = [Point::new(0.001, 0.0), Point::new(0.0, 0.0)];
        assert!(router.route(&forward).is_ok());
        assert!(matches!(router.route(&backward), Err(Error::RouteNotFound)));
    }

    #[test]
    fn falls_back_past_an_isolated_nearest_vertex() {
        // A connected street to the east, and a short impassable stub whose
        // endpoints are the two vertices nearest the first waypoint.
        let features = vec![
            residential(&[(0.0, 0.0), (0.001, 0.0)]),
            feature(&[(-0.0002, 0.0), (-0.0003, 0.0)], "abandoned"),
        ];
        let router = Router::new(&features, GraphConfig::default()).unwrap();

        let route = router
            .route(&[Point::new(-0.00019, 0.0), Point::new(0.00101, 0.0)])
            .unwrap();

        // The stub vertices were closer but edge-less; the street vertex won.
        assert_eq!(route.snapped_waypoints[0], Point::new(0.0, 0.0));
        assert!(route.total_time > 0.0);
    }

    #[test]
    fn multi_waypoint_route_sums_legs() {
        let features = vec![
            residential(&[(0.0, 0.0), (0.001, 0.0)]),
            residential(&[(0.001, 0.0), (0.001, 0.001)]),
        ];
        let router = Router::new(&features, GraphConfig::default()).unwrap();

        let route = router
            .route(&[
                Point::new(0.0, 0.0),
                Point::new(0.001, 0.0),
                Point::new(0.001, 0.001),
            ])
            .unwrap();

        assert_eq!(route.legs.len(), 2);
        let leg_time: f64 = route.legs.iter().map(|l| l.weight).sum();
        assert!((route.total_time - leg_time).abs() < 1e-12);
        assert_eq!(
            route.total_nodes,
            route.legs.iter().map(|l| l.path.len()).sum::<usize>()
        );
    }

    #[test]
    fn rebuild_is_idempotent() {
        let first = Router::new(&street(), GraphConfig::default()).unwrap();
        let second = Router::new(&street(), GraphConfig::default()).unwrap();

        assert_eq!(first.summary(), second.summary());

        let waypoints = [Point::new(0.0, 0.0), Point::new(0.002, 0.0)];
        let a = first.route(&waypoints).unwrap();
        let b = second.route(&waypoints).unwrap();
        assert_eq!(a.total_time, b.total_time);
        assert_eq!(a.coordinates, b.coordinates);
    }

    #[test]
    fn speed_updates_apply_only_after_rebuild() {
        let mut router = Router::new(&street(), GraphConfig::default()).unwrap();
        let waypoints = [Point::new(0.0, 0.0), Point::new(0.002, 0.0)];

        let before = router.route(&waypoints).unwrap();
        router.update_highway_speed("residential", 60.0);
        let unchanged = router.route(&waypoints).unwrap();
        assert_eq!(before.total_time, unchanged.total_time);

        router.rebuild_weights().unwrap();
        let after = router.route(&waypoints).unwrap();
        assert!((after.total_time - before.total_time / 2.0).abs() < 1e-9);
        assert_eq!(after.total_distance, before.total_distance);
    }

    #[test]
    fn failed_network_swap_keeps_the_old_model() {
        let mut router = Router::new(&street(), GraphConfig::default()).unwrap();
        let summary = router.summary();

        let unroutable = vec![residential(&[(0.0, 0.0)])];
        assert!(router.set_network(&unroutable).is_err());

        assert_eq!(router.summary(), summary);
        assert!(
            router
                .route(&[Point::new(0.0, 0.0), Point::new(0.002, 0.0)])
                .is_ok()
        );
    }

    #[test]
    fn route_exports_geojson_with_summary_properties() {
        let router = Router::new(&street(), GraphConfig::default()).unwrap();
        let route = router
            .route(&[Point::new(0.0, 0.0), Point::new(0.002, 0.0)])
            .unwrap();

        let feature = route.to_geojson();
        let properties = feature.properties.unwrap();
        assert_eq!(
            properties["totalDistance"],
            serde_json::json!(route.summary().total_distance)
        );
        assert!(properties["instructions"].is_array());
        assert!(feature.geometry.is_some());
    }

    #[test]
    fn unknown_classes_are_reported() {
        let features = vec![
            residential(&[(0.0, 0.0), (0.001, 0.0)]),
            feature(&[(0.001, 0.0), (0.002, 0.0)], "bridleway"),
        ];
        let router = Router::new(&features, GraphConfig::default()).unwrap();
        assert!(router.unknown_classifications().contains("bridleway"));
    }
}
