//! The map view: camera, graticule, pins and polygon rendering, and the
//! input that feeds the annotation engine.

mod camera;
mod graticule;
mod input;
pub mod params;
mod pins;
pub mod projection;
mod rendering;

pub use camera::MapCamera;
pub use pins::{MarkerPin, PinQueue};

use bevy::prelude::*;

use crate::annotation::{AnnotationUpdate, Annotations};
use crate::config::ConfigLoaded;
use crate::theme;
use crate::ui::no_dialog_open;

pub struct MapViewPlugin;

impl Plugin for MapViewPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(theme::MAP_BACKGROUND))
            .add_systems(Startup, camera::spawn_camera.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    graticule::draw_graticule,
                ),
            )
            .add_systems(
                Update,
                (input::handle_map_click, input::handle_map_shortcuts)
                    .before(AnnotationUpdate)
                    .run_if(no_dialog_open)
                    .run_if(resource_exists::<Annotations>),
            )
            .add_systems(
                Update,
                (
                    camera::focus_selected_marker,
                    pins::sync_marker_pins,
                    rendering::draw_polygons,
                    rendering::draw_polygon_preview,
                    rendering::draw_marker_pins,
                )
                    .chain()
                    .after(AnnotationUpdate)
                    .run_if(resource_exists::<Annotations>),
            );
    }
}
