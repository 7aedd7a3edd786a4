//! End-to-end pipeline tests: GeoJSON in, routes and statistics out.

use geo::{Coord, Point};
use viarota::loading::{GraphConfig, LineFeature, WayTags, build_road_model};
use viarota::routing::{Router, path_weights};
use viarota::Error;

const NETWORK: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [
                    [-49.250, -16.670], [-49.249, -16.670], [-49.248, -16.670],
                    [-49.247, -16.670], [-49.246, -16.670]
                ]
            },
            "properties": {"highway": "residential"}
        },
        {
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [
                    [-49.248, -16.670], [-49.248, -16.669], [-49.248, -16.668]
                ]
            },
            "properties": {"highway": "tertiary"}
        },
        {
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [[-49.246, -16.670], [-49.246, -16.6695]]
            },
            "properties": {"highway": "service", "oneway": "yes"}
        }
    ]
}"#;

#[test]
fn geojson_to_route() {
    let router = Router::from_geojson_str(NETWORK, GraphConfig::default()).unwrap();

    let summary = router.summary();
    assert_eq!(summary.source_point_count, 10);
    assert!(summary.vertex_count >= 8);
    assert!(summary.total_length_km > 0.5);

    let route = router
        .route(&[
            Point::new(-49.250, -16.670),
            Point::new(-49.248, -16.668),
        ])
        .unwrap();

    // Two residential segments west-east, then two tertiary segments north.
    assert_eq!(route.legs.len(), 1);
    assert_eq!(route.total_nodes, 5);
    assert!(route.total_time > 0.0);
    assert!(route.total_distance > 400.0);

    let feature = route.to_geojson();
    let properties = feature.properties.expect("summary properties");
    assert!(properties.contains_key("totalDistance"));
    assert!(properties.contains_key("totalTime"));
    assert!(properties.contains_key("instructions"));
}

#[test]
fn parse_failure_surfaces_as_error() {
    let result = Router::from_geojson_str("{\"type\": \"FeatureCollection\"", GraphConfig::default());
    assert!(result.is_err());

    let empty = r#"{"type": "FeatureCollection", "features": []}"#;
    assert!(matches!(
        Router::from_geojson_str(empty, GraphConfig::default()),
        Err(Error::Parse(_))
    ));
}

#[test]
fn repeated_builds_are_identical() {
    let first = Router::from_geojson_str(NETWORK, GraphConfig::default()).unwrap();
    let second = Router::from_geojson_str(NETWORK, GraphConfig::default()).unwrap();

    assert_eq!(first.summary(), second.summary());
    assert_eq!(
        first.model().compact.node_count(),
        second.model().compact.node_count()
    );
    assert_eq!(
        first.model().compact.edge_count(),
        second.model().compact.edge_count()
    );

    let waypoints = [
        Point::new(-49.250, -16.670),
        Point::new(-49.246, -16.670),
    ];
    let a = first.route(&waypoints).unwrap();
    let b = second.route(&waypoints).unwrap();
    assert_eq!(a.total_time, b.total_time);
    assert_eq!(a.coordinates, b.coordinates);
}

fn tagged(coords: Vec<(f64, f64)>, highway: &str, maxspeed: Option<&str>, oneway: bool) -> LineFeature {
    let tags = WayTags {
        highway: Some(highway.to_string()),
        maxspeed: maxspeed.map(str::to_string),
        oneway: oneway.then(|| "yes".to_string()),
        ..WayTags::default()
    };
    LineFeature::new(
        coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        tags,
    )
}

/// A network with long pass-through chains, junctions, a dead-end spur, a
/// one-way loop, and an impassable stretch: enough shapes to exercise the
/// compactor thoroughly.
fn chain_heavy_network() -> Vec<LineFeature> {
    let main: Vec<(f64, f64)> = (0..9).map(|i| (i as f64 * 0.001, 0.0)).collect();
    let cross_a: Vec<(f64, f64)> = (-2..=2).map(|i| (0.003, i as f64 * 0.001)).collect();
    let cross_b: Vec<(f64, f64)> = (-2..=2).map(|i| (0.006, i as f64 * 0.001)).collect();

    vec![
        tagged(main, "residential", None, false),
        tagged(cross_a, "tertiary", Some("40"), false),
        tagged(cross_b, "secondary", None, false),
        tagged(vec![(0.008, 0.0), (0.008, 0.001)], "service", None, false),
        tagged(
            vec![(0.0, 0.0), (0.0, 0.002), (0.003, 0.002)],
            "unclassified",
            None,
            true,
        ),
        tagged(vec![(0.006, 0.002), (0.007, 0.003)], "track", None, false),
    ]
}

#[test]
fn compaction_preserves_shortest_path_weights() {
    let model = build_road_model(&chain_heavy_network(), &GraphConfig::default()).unwrap();

    assert!(model.compact.node_count() < model.graph.node_count());

    for (key, &compact_source) in &model.compact_ids {
        let full_source = model.node_ids[key];
        let full = path_weights(&model.graph, full_source, None);
        let compact = path_weights(&model.compact, compact_source, None);

        for (target_key, &compact_target) in &model.compact_ids {
            let full_target = model.node_ids[target_key];
            match (full.get(&full_target), compact.get(&compact_target)) {
                (Some(a), Some(b)) => {
                    assert!(
                        (a - b).abs() <= 1e-6 * a.abs().max(1.0),
                        "weight mismatch {key} -> {target_key}: {a} vs {b}"
                    );
                }
                (None, None) => {}
                (a, b) => panic!("reachability mismatch {key} -> {target_key}: {a:?} vs {b:?}"),
            }
        }
    }
}
