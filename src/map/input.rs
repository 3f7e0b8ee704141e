//! Mouse and keyboard input on the map.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::annotation::{
    Annotations, DeletePolygonRequest, FinishPolygonRequest, MapClicked, Mode,
    NudgePolygonRequest, SelectMarkerRequest, SetModeRequest,
};
use crate::constants::{NUDGE_DEGREES, PIN_RADIUS_PX};

use super::params::{CameraParams, is_cursor_over_ui, ui_wants_keyboard};
use super::pins::{MarkerPin, pin_at};
use super::projection::world_to_geo;

fn shift_held(keyboard: &ButtonInput<KeyCode>) -> bool {
    keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight)
}

/// Turns a left click into a map click. In marker mode, clicking an existing
/// pin selects it instead of placing a new one.
pub fn handle_map_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    camera: CameraParams,
    annotations: Res<Annotations>,
    pins: Query<(&MarkerPin, &Transform)>,
    mut contexts: EguiContexts,
    mut clicks: MessageWriter<MapClicked>,
    mut select_marker: MessageWriter<SelectMarkerRequest>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    // Don't act on clicks meant for the control panel
    if is_cursor_over_ui(&mut contexts) {
        return;
    }

    let Some(world_pos) = camera.cursor_world_pos() else {
        return;
    };

    if annotations.mode() == Mode::Marker {
        let radius = PIN_RADIUS_PX * camera.zoom_scale();
        if let Some(id) = pin_at(pins.iter(), world_pos, radius) {
            select_marker.write(SelectMarkerRequest(id));
            return;
        }
    }

    let [lng, lat] = world_to_geo(world_pos);
    clicks.write(MapClicked {
        lng,
        lat,
        select: shift_held(&keyboard),
    });
}

/// M/P switch modes, Enter finishes a polygon, Escape/Delete trash the
/// selection, arrow keys nudge the selected polygon (Shift for 10x).
pub fn handle_map_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut set_mode: MessageWriter<SetModeRequest>,
    mut finish: MessageWriter<FinishPolygonRequest>,
    mut delete: MessageWriter<DeletePolygonRequest>,
    mut nudge: MessageWriter<NudgePolygonRequest>,
) {
    // Don't steal keys from text fields
    if ui_wants_keyboard(&mut contexts) {
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyM) {
        set_mode.write(SetModeRequest(Mode::Marker));
    } else if keyboard.just_pressed(KeyCode::KeyP) {
        set_mode.write(SetModeRequest(Mode::Polygon));
    }

    if keyboard.just_pressed(KeyCode::Enter) {
        finish.write(FinishPolygonRequest);
    }

    if keyboard.just_pressed(KeyCode::Escape) || keyboard.just_pressed(KeyCode::Delete) {
        delete.write(DeletePolygonRequest);
    }

    let step = if shift_held(&keyboard) {
        NUDGE_DEGREES * 10.0
    } else {
        NUDGE_DEGREES
    };
    let (dlng, dlat) = nudge_direction(&keyboard);
    if dlng != 0.0 || dlat != 0.0 {
        nudge.write(NudgePolygonRequest {
            dlng: dlng * step,
            dlat: dlat * step,
        });
    }
}

fn nudge_direction(keyboard: &ButtonInput<KeyCode>) -> (f64, f64) {
    let mut direction = (0.0, 0.0);
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        direction.0 -= 1.0;
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        direction.0 += 1.0;
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        direction.1 -= 1.0;
    }
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        direction.1 += 1.0;
    }
    direction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nudge_direction() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(nudge_direction(&keyboard), (0.0, 0.0));

        keyboard.press(KeyCode::ArrowLeft);
        keyboard.press(KeyCode::ArrowUp);
        assert_eq!(nudge_direction(&keyboard), (-1.0, 1.0));
    }

    #[test]
    fn test_opposite_arrows_cancel() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::ArrowLeft);
        keyboard.press(KeyCode::ArrowRight);
        assert_eq!(nudge_direction(&keyboard), (0.0, 0.0));
    }

    #[test]
    fn test_shift_held() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert!(!shift_held(&keyboard));
        keyboard.press(KeyCode::ShiftRight);
        assert!(shift_held(&keyboard));
    }
}
