//! GeoJSON line-feature input
//!
//! The engine consumes a collection of line features with OSM-style tags.
//! Producers (format conversion, clipping) are upstream of this contract;
//! anything that is not a `LineString` is skipped here.

use std::sync::Arc;

use geo::Coord;
use geojson::{FeatureCollection, GeoJson, GeometryValue};
use log::debug;
use serde_json::Map;

use crate::Error;

/// Tags of a single road segment, extracted from feature properties.
///
/// The four routing-relevant tags are parsed out; the full property map is
/// retained for edge-data callbacks.
#[derive(Debug, Clone, Default)]
pub struct WayTags {
    pub highway: Option<String>,
    pub maxspeed: Option<String>,
    pub oneway: Option<String>,
    pub junction: Option<String>,
    /// All original feature properties.
    pub properties: Map<String, serde_json::Value>,
}

impl WayTags {
    pub fn from_properties(properties: Option<Map<String, serde_json::Value>>) -> Self {
        let properties = properties.unwrap_or_default();
        let tag = |name: &str| {
            properties.get(name).and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        Self {
            highway: tag("highway"),
            maxspeed: tag("maxspeed"),
            oneway: tag("oneway"),
            junction: tag("junction"),
            properties,
        }
    }
}

/// One line geometry with its tags, the unit of topology input.
#[derive(Debug, Clone)]
pub struct LineFeature {
    pub coords: Vec<Coord<f64>>,
    pub tags: Arc<WayTags>,
}

impl LineFeature {
    pub fn new(coords: Vec<Coord<f64>>, tags: WayTags) -> Self {
        Self {
            coords,
            tags: Arc::new(tags),
        }
    }
}

/// Extracts routable line features from a parsed `FeatureCollection`.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the collection contains no usable
/// `LineString` features.
pub fn line_features(collection: &FeatureCollection) -> Result<Vec<LineFeature>, Error> {
    let mut features = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            skipped += 1;
            continue;
        };
        let GeometryValue::LineString { coordinates: positions } = &geometry.value else {
            skipped += 1;
            continue;
        };

        let coords = positions
            .iter()
            .map(|p| match p.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(Error::Parse(format!(
                    "position with {} ordinates in LineString",
                    p.len()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        features.push(LineFeature::new(
            coords,
            WayTags::from_properties(feature.properties.clone()),
        ));
    }

    if skipped > 0 {
        debug!("Skipped {skipped} non-LineString features");
    }

    if features.is_empty() {
        return Err(Error::Parse(
            "network contains no LineString features".to_string(),
        ));
    }

    Ok(features)
}

/// Parses a GeoJSON document and extracts its line features.
///
/// # Errors
///
/// Returns [`Error::GeoJson`] on malformed input and [`Error::Parse`] if the
/// document is not a `FeatureCollection` with usable `LineString` features.
pub fn line_features_from_str(geojson: &str) -> Result<Vec<LineFeature>, Error> {
    let parsed: GeoJson = geojson.parse()?;
    match parsed {
        GeoJson::FeatureCollection(collection) => line_features(&collection),
        _ => Err(Error::Parse(
            "expected a GeoJSON FeatureCollection".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-49.25, -16.67], [-49.24, -16.67]]
                },
                "properties": {"highway": "residential", "oneway": "yes"}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-49.25, -16.67]
                },
                "properties": {}
            }
        ]
    }"#;

    #[test]
    fn parses_line_strings_and_skips_points() {
        let features = line_features_from_str(NETWORK).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].coords.len(), 2);
        assert_eq!(features[0].tags.highway.as_deref(), Some("residential"));
        assert_eq!(features[0].tags.oneway.as_deref(), Some("yes"));
    }

    #[test]
    fn numeric_tags_are_stringified() {
        let mut properties = Map::new();
        properties.insert("maxspeed".to_string(), serde_json::json!(60));
        let tags = WayTags::from_properties(Some(properties));
        assert_eq!(tags.maxspeed.as_deref(), Some("60"));
    }

    #[test]
    fn empty_collection_is_a_parse_error() {
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(
            line_features_from_str(empty),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(line_features_from_str("{not geojson").is_err());
    }
}
