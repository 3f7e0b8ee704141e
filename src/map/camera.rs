use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::annotation::{Annotations, SelectMarkerRequest};
use crate::config::AppConfig;
use crate::constants::DEFAULT_ZOOM;

use super::params::is_cursor_over_ui;
use super::projection::{geo_to_world, world_bounds};

/// Closest zoom (world units per pixel)
const MIN_SCALE: f32 = 0.001;
/// Furthest zoom, roughly the whole globe in a default window
const MAX_SCALE: f32 = 250.0;

#[derive(Component)]
pub struct MapCamera;

#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: DEFAULT_ZOOM }
    }
}

impl CameraZoom {
    /// Multiplicative zoom so each wheel notch feels the same at any scale.
    pub fn zoom_by(&mut self, scroll: f32) {
        self.scale = (self.scale * (1.0 - scroll).max(0.1)).clamp(MIN_SCALE, MAX_SCALE);
    }
}

pub fn spawn_camera(mut commands: Commands, config: Res<AppConfig>) {
    let [lng, lat] = config.data.initial_center;
    let center = geo_to_world(lng, lat);

    commands.spawn((
        Camera2d,
        MapCamera,
        // Applied to the projection by apply_camera_zoom on the first frame
        CameraZoom::default(),
        Transform::from_translation(center.extend(1000.0)),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<MapCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) && !mouse_button.pressed(MouseButton::Right) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }

    let bounds = world_bounds();
    transform.translation.x = transform.translation.x.clamp(bounds.min.x, bounds.max.x);
    transform.translation.y = transform.translation.y.clamp(bounds.min.y, bounds.max.y);
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<MapCamera>>,
    mut contexts: EguiContexts,
) {
    // Scrolling the marker list must not zoom the map
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.1,
            MouseScrollUnit::Pixel => event.y * 0.001,
        };
        zoom.zoom_by(scroll_amount);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<MapCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Centers the view on a marker picked from the list.
pub fn focus_selected_marker(
    mut events: MessageReader<SelectMarkerRequest>,
    annotations: Res<Annotations>,
    mut camera_query: Query<&mut Transform, With<MapCamera>>,
) {
    let Some(SelectMarkerRequest(id)) = events.read().last() else {
        return;
    };
    let Some(marker) = annotations.markers().find(|m| m.id == *id) else {
        return;
    };
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let target = geo_to_world(marker.lng, marker.lat);
    transform.translation.x = target.x;
    transform.translation.y = target.y;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_in_and_out() {
        let mut zoom = CameraZoom { scale: 1.0 };
        zoom.zoom_by(0.1);
        assert!((zoom.scale - 0.9).abs() < 1e-6);
        zoom.zoom_by(-0.1);
        assert!((zoom.scale - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut zoom = CameraZoom { scale: MIN_SCALE };
        zoom.zoom_by(0.5);
        assert_eq!(zoom.scale, MIN_SCALE);

        let mut zoom = CameraZoom { scale: MAX_SCALE };
        zoom.zoom_by(-0.5);
        assert_eq!(zoom.scale, MAX_SCALE);
    }

    #[test]
    fn test_huge_scroll_never_flips_sign() {
        let mut zoom = CameraZoom { scale: 1.0 };
        zoom.zoom_by(5.0);
        assert!(zoom.scale > 0.0);
    }
}
