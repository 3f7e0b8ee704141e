//! Gizmo rendering of polygons, the polygon being drawn, and marker pins.

use bevy::prelude::*;

use crate::annotation::geojson::Geometry;
use crate::annotation::widget::DrawingWidget;
use crate::annotation::{Annotations, Mode};
use crate::constants::PIN_RADIUS_PX;
use crate::theme;

use super::params::CameraParams;
use super::pins::MarkerPin;
use super::projection::{geo_to_world, position_to_world};

/// Vertex dot radius in screen pixels
const VERTEX_RADIUS_PX: f32 = 3.0;

fn draw_ring(gizmos: &mut Gizmos, ring: &[Vec<f64>], color: Color, vertex_radius: f32) {
    let points: Vec<Vec2> = ring.iter().filter_map(|p| position_to_world(p)).collect();
    for pair in points.windows(2) {
        gizmos.line_2d(pair[0], pair[1], color);
    }
    // Closed rings repeat the first point; skip the duplicate dot
    let dots = match points.as_slice() {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => &points[..],
    };
    for point in dots {
        gizmos.circle_2d(Isometry2d::from_translation(*point), vertex_radius, color);
    }
}

pub fn draw_polygons(mut gizmos: Gizmos, annotations: Res<Annotations>, camera: CameraParams) {
    let vertex_radius = VERTEX_RADIUS_PX * camera.zoom_scale();
    let widget = annotations.widget();
    let selected = widget.selected_id();

    for feature in &widget.collection().features {
        let Some(Geometry::Polygon { coordinates }) = &feature.geometry else {
            continue;
        };
        let color = if selected.is_some() && feature.id_key().as_deref() == selected {
            theme::SELECTION_COLOR
        } else {
            theme::POLYGON_OUTLINE
        };
        for ring in coordinates {
            draw_ring(&mut gizmos, ring, color, vertex_radius);
        }
    }
}

/// The in-progress shape, with a rubber band to the cursor.
pub fn draw_polygon_preview(
    mut gizmos: Gizmos,
    annotations: Res<Annotations>,
    camera: CameraParams,
) {
    if annotations.mode() != Mode::Polygon {
        return;
    }

    let vertices: Vec<Vec2> = annotations
        .widget()
        .pending_vertices()
        .iter()
        .map(|[lng, lat]| geo_to_world(*lng, *lat))
        .collect();
    let Some(last) = vertices.last().copied() else {
        return;
    };

    let vertex_radius = VERTEX_RADIUS_PX * camera.zoom_scale();
    for pair in vertices.windows(2) {
        gizmos.line_2d(pair[0], pair[1], theme::POLYGON_PREVIEW);
    }
    for vertex in &vertices {
        gizmos.circle_2d(
            Isometry2d::from_translation(*vertex),
            vertex_radius,
            theme::POLYGON_PREVIEW,
        );
    }

    if let Some(cursor) = camera.cursor_world_pos() {
        gizmos.line_2d(last, cursor, theme::POLYGON_PREVIEW);
        if vertices.len() >= 2 {
            gizmos.line_2d(cursor, vertices[0], theme::POLYGON_PREVIEW_CLOSING);
        }
    }
}

pub fn draw_marker_pins(
    mut gizmos: Gizmos,
    annotations: Res<Annotations>,
    camera: CameraParams,
    pins: Query<(&MarkerPin, &Transform)>,
) {
    let radius = PIN_RADIUS_PX * camera.zoom_scale();
    let selected = annotations.selected_marker();

    for (pin, transform) in pins.iter() {
        let center = transform.translation.truncate();
        let color = if Some(pin.id) == selected {
            theme::PIN_SELECTED
        } else {
            theme::PIN_COLOR
        };
        // Pin head above the point, stem down to it
        let head = center + Vec2::new(0.0, radius * 2.0);
        gizmos.line_2d(center, head, color);
        gizmos.circle_2d(Isometry2d::from_translation(head), radius, color);
        gizmos.circle_2d(Isometry2d::from_translation(head), radius * 0.4, color);
    }
}
