//! Common SystemParam bundles for map systems.
//!
//! - [`CameraParams`]: camera and window access for cursor-to-world conversion
//! - [`is_cursor_over_ui`]: check if the cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

use super::camera::{CameraZoom, MapCamera};

/// Bundled camera and window queries for cursor-to-world calculations
#[derive(SystemParam)]
pub struct CameraParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub camera: Query<
        'w,
        's,
        (&'static Camera, &'static GlobalTransform, &'static CameraZoom),
        With<MapCamera>,
    >,
}

impl CameraParams<'_, '_> {
    /// Get the world position of the cursor, if available
    pub fn cursor_world_pos(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        let (camera, transform, _) = self.camera.single().ok()?;
        let cursor_pos = window.cursor_position()?;
        camera.viewport_to_world_2d(transform, cursor_pos).ok()
    }

    /// World units per screen pixel
    pub fn zoom_scale(&self) -> f32 {
        self.camera
            .single()
            .map(|(_, _, zoom)| zoom.scale)
            .unwrap_or(1.0)
    }

    /// Window size in logical pixels, the default size before a window exists
    pub fn viewport_size(&self) -> Vec2 {
        self.window
            .single()
            .map(|window| window.size())
            .unwrap_or(Vec2::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT))
    }

    /// Camera center in world units
    pub fn center(&self) -> Vec2 {
        self.camera
            .single()
            .map(|(_, transform, _)| transform.translation().truncate())
            .unwrap_or(Vec2::ZERO)
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

/// Check if egui has keyboard focus (a text field is being edited)
pub fn ui_wants_keyboard(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}
