//! Equirectangular mapping between geographic and world coordinates.
//!
//! One degree is [`WORLD_UNITS_PER_DEGREE`] world units on both axes, with
//! longitude along +x and latitude along +y.

use bevy::prelude::*;

use crate::constants::WORLD_UNITS_PER_DEGREE;

pub fn geo_to_world(lng: f64, lat: f64) -> Vec2 {
    Vec2::new(
        (lng * WORLD_UNITS_PER_DEGREE) as f32,
        (lat * WORLD_UNITS_PER_DEGREE) as f32,
    )
}

/// Returns `[lng, lat]`.
pub fn world_to_geo(position: Vec2) -> [f64; 2] {
    [
        position.x as f64 / WORLD_UNITS_PER_DEGREE,
        position.y as f64 / WORLD_UNITS_PER_DEGREE,
    ]
}

/// World position of a GeoJSON position (`[lng, lat, ..]`).
pub fn position_to_world(position: &[f64]) -> Option<Vec2> {
    match position {
        [lng, lat, ..] => Some(geo_to_world(*lng, *lat)),
        _ => None,
    }
}

/// World-space rectangle covering the whole globe.
pub fn world_bounds() -> Rect {
    Rect::from_corners(geo_to_world(-180.0, -90.0), geo_to_world(180.0, 90.0))
}
