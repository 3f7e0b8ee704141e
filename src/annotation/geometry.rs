//! Area computation for polygon feature collections.
//!
//! Areas are spherical (square meters) using the Chamberlain–Duquette
//! algorithm from `geo`, which is the same approximation web map tooling
//! reports for drawn shapes.

use geo::{ChamberlainDuquetteArea, Contains, Coord, LineString, Point, Polygon};

use super::geojson::{FeatureCollection, Geometry, Ring};

/// Total area of every polygon in the collection, in square meters.
///
/// Non-polygon features contribute nothing.
pub fn geodesic_area(collection: &FeatureCollection) -> f64 {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref())
        .map(geometry_area)
        .sum()
}

/// Area rounded to 2 decimals, or `None` when there are no features at all.
///
/// `None` is distinct from `Some(0.0)`: an empty collection has no area,
/// a degenerate polygon has zero area.
pub fn rounded_area(collection: &FeatureCollection) -> Option<f64> {
    if collection.is_empty() {
        return None;
    }
    Some(round_to_cents(geodesic_area(collection)))
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn geometry_area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon { coordinates } => to_geo_polygon(coordinates)
            .map(|polygon| polygon.chamberlain_duquette_unsigned_area())
            .unwrap_or(0.0),
        Geometry::Point { .. } | Geometry::Unsupported => 0.0,
    }
}

/// Converts GeoJSON rings (exterior first, then holes) to a `geo` polygon.
pub fn to_geo_polygon(rings: &[Ring]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        to_line_string(exterior),
        interiors.iter().map(to_line_string).collect(),
    ))
}

fn to_line_string(ring: &Ring) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| Coord {
                x: position[0],
                y: position[1],
            })
            .collect::<Vec<_>>(),
    )
}

/// Point-in-polygon test used for polygon selection.
pub fn polygon_contains(rings: &[Ring], lng: f64, lat: f64) -> bool {
    to_geo_polygon(rings)
        .map(|polygon| polygon.contains(&Point::new(lng, lat)))
        .unwrap_or(false)
}
