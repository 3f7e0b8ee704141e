//! Longitude/latitude lines with spacing that follows the zoom level.

use bevy::prelude::*;

use crate::constants::WORLD_UNITS_PER_DEGREE;
use crate::theme;

use super::params::CameraParams;
use super::projection::world_bounds;

/// Aim for roughly this many pixels between lines.
const TARGET_SPACING_PX: f64 = 120.0;

/// Line spacings in degrees, smallest first.
const STEPS: [f64; 16] = [
    0.0001, 0.0002, 0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 5.0, 10.0,
    30.0,
];

/// Graticule spacing in degrees for a camera scale (world units per pixel).
pub fn graticule_step(scale: f32) -> f64 {
    let wanted = scale as f64 * TARGET_SPACING_PX / WORLD_UNITS_PER_DEGREE;
    STEPS
        .iter()
        .copied()
        .find(|step| *step >= wanted)
        .unwrap_or(STEPS[STEPS.len() - 1])
}

/// World-space area shown by a camera at `center` with `scale` world units
/// per pixel over a viewport of `viewport` pixels.
pub fn visible_rect(center: Vec2, viewport: Vec2, scale: f32) -> Rect {
    let half_view = viewport * scale / 2.0;
    Rect::from_corners(center - half_view, center + half_view)
}

pub fn draw_graticule(mut gizmos: Gizmos, camera: CameraParams) {
    let scale = camera.zoom_scale();

    let bounds = world_bounds();
    gizmos.rect_2d(
        Isometry2d::from_translation(bounds.center()),
        bounds.size(),
        theme::WORLD_EDGE_COLOR,
    );

    // Clamp the visible area to the globe
    let view = visible_rect(camera.center(), camera.viewport_size(), scale).intersect(bounds);
    if view.is_empty() {
        return;
    }

    let step = (graticule_step(scale) * WORLD_UNITS_PER_DEGREE) as f32;
    let start_x = (view.min.x / step).ceil() as i32;
    let end_x = (view.max.x / step).floor() as i32;
    let start_y = (view.min.y / step).ceil() as i32;
    let end_y = (view.max.y / step).floor() as i32;

    for x in start_x..=end_x {
        let x_pos = x as f32 * step;
        let color = if x == 0 {
            theme::MERIDIAN_COLOR
        } else {
            theme::GRATICULE_COLOR
        };
        gizmos.line_2d(Vec2::new(x_pos, view.min.y), Vec2::new(x_pos, view.max.y), color);
    }

    for y in start_y..=end_y {
        let y_pos = y as f32 * step;
        let color = if y == 0 {
            theme::MERIDIAN_COLOR
        } else {
            theme::GRATICULE_COLOR
        };
        gizmos.line_2d(Vec2::new(view.min.x, y_pos), Vec2::new(view.max.x, y_pos), color);
    }
}
