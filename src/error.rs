use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse network data: {0}")]
    Parse(String),
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("No route found between the given waypoints")]
    RouteNotFound,
    #[error("No nearby points found for snapping")]
    NoPointsFound,
    #[error("Internal routing error: {0}")]
    InternalRouting(String),
}
