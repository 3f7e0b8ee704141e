//! Annotation state: markers, polygons, area, mode and their persistence.
//!
//! The engine itself is plain Rust and knows nothing about Bevy beyond log
//! macros. This module wraps it in a resource and feeds it input messages.

pub mod codec;
pub mod draw;
pub mod engine;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod marker;
pub mod mode;
pub mod persistence;
pub mod store;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use draw::PolygonDraw;
pub use engine::{AnnotationEngine, ExportArtifact, ImportSummary};
pub use error::{ExportError, ImportError};
pub use marker::{Marker, MarkerId};
pub use mode::Mode;
pub use persistence::FileStore;

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};
use crate::map::{MapCamera, PinQueue};

pub type MapAnnotations = AnnotationEngine<PolygonDraw, PinQueue, FileStore>;

/// The single annotation engine of the app.
#[derive(Resource, Deref, DerefMut)]
pub struct Annotations(pub MapAnnotations);

/// A left click on the map, already converted to geographic coordinates.
#[derive(Message)]
pub struct MapClicked {
    pub lng: f64,
    pub lat: f64,
    /// Shift held: pick a polygon instead of placing a marker
    pub select: bool,
}

#[derive(Message)]
pub struct SetModeRequest(pub Mode);

#[derive(Message)]
pub struct RemoveMarkerRequest(pub MarkerId);

#[derive(Message)]
pub struct SelectMarkerRequest(pub MarkerId);

#[derive(Message)]
pub struct ClearAllRequest;

#[derive(Message)]
pub struct FinishPolygonRequest;

#[derive(Message)]
pub struct DeletePolygonRequest;

#[derive(Message)]
pub struct NudgePolygonRequest {
    pub dlng: f64,
    pub dlat: f64,
}

/// Builds the engine over the configured storage directory and loads the
/// saved snapshot. Restoring waits for the map view.
fn setup_annotations(mut commands: Commands, config: Res<AppConfig>) {
    let store = FileStore::new(config.storage_dir());
    info!("Annotation storage at {:?}", store.dir());

    let mut engine = AnnotationEngine::new(PolygonDraw::default(), PinQueue::default(), store);
    engine.start();
    commands.insert_resource(Annotations(engine));
}

/// Marks the drawing widget ready once the map camera exists, then lets the
/// engine replay the saved snapshot.
fn signal_widget_ready(mut annotations: ResMut<Annotations>, camera: Query<(), With<MapCamera>>) {
    if annotations.is_ready() || camera.is_empty() {
        return;
    }
    annotations.widget_mut().mark_ready();
    annotations.poll_ready();
}

fn handle_map_clicks(mut events: MessageReader<MapClicked>, mut annotations: ResMut<Annotations>) {
    for event in events.read() {
        if event.select && annotations.mode() == Mode::Marker {
            annotations.select_polygon_at(event.lng, event.lat);
        } else {
            annotations.handle_map_click(event.lng, event.lat);
        }
    }
}

fn handle_set_mode(mut events: MessageReader<SetModeRequest>, mut annotations: ResMut<Annotations>) {
    for SetModeRequest(mode) in events.read() {
        annotations.set_mode(*mode);
    }
}

fn handle_remove_marker(
    mut events: MessageReader<RemoveMarkerRequest>,
    mut annotations: ResMut<Annotations>,
) {
    for RemoveMarkerRequest(id) in events.read() {
        if !annotations.remove_marker(*id) {
            warn!("No marker with id {} to remove", id);
        }
    }
}

fn handle_select_marker(
    mut events: MessageReader<SelectMarkerRequest>,
    mut annotations: ResMut<Annotations>,
) {
    for SelectMarkerRequest(id) in events.read() {
        annotations.select_marker(*id);
    }
}

fn handle_clear_all(mut events: MessageReader<ClearAllRequest>, mut annotations: ResMut<Annotations>) {
    // Several clicks in one frame clear once
    if events.read().count() > 0 {
        annotations.clear_all();
    }
}

fn handle_finish_polygon(
    mut events: MessageReader<FinishPolygonRequest>,
    mut annotations: ResMut<Annotations>,
) {
    for _ in events.read() {
        if !annotations.finish_polygon() {
            debug!("Nothing to finish: a polygon needs at least 3 points");
        }
    }
}

fn handle_delete_polygon(
    mut events: MessageReader<DeletePolygonRequest>,
    mut annotations: ResMut<Annotations>,
) {
    for _ in events.read() {
        annotations.delete_selected_polygon();
    }
}

fn handle_nudge_polygon(
    mut events: MessageReader<NudgePolygonRequest>,
    mut annotations: ResMut<Annotations>,
) {
    for event in events.read() {
        annotations.nudge_selected_polygon(event.dlng, event.dlat);
    }
}

fn process_draw_events(mut annotations: ResMut<Annotations>) {
    annotations.process_draw_events();
}

fn tick_mode_notice(time: Res<Time>, mut annotations: ResMut<Annotations>) {
    if annotations.mode_notice().is_some() {
        annotations.tick(time.delta());
    }
}

/// System set for systems that mutate annotation state
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationUpdate;

pub struct AnnotationPlugin;

impl Plugin for AnnotationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MapClicked>()
            .add_message::<SetModeRequest>()
            .add_message::<RemoveMarkerRequest>()
            .add_message::<SelectMarkerRequest>()
            .add_message::<ClearAllRequest>()
            .add_message::<FinishPolygonRequest>()
            .add_message::<DeletePolygonRequest>()
            .add_message::<NudgePolygonRequest>()
            .add_systems(Startup, setup_annotations.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    signal_widget_ready,
                    handle_set_mode.run_if(on_message::<SetModeRequest>),
                    handle_map_clicks.run_if(on_message::<MapClicked>),
                    handle_remove_marker.run_if(on_message::<RemoveMarkerRequest>),
                    handle_select_marker.run_if(on_message::<SelectMarkerRequest>),
                    handle_clear_all.run_if(on_message::<ClearAllRequest>),
                    handle_finish_polygon.run_if(on_message::<FinishPolygonRequest>),
                    handle_delete_polygon.run_if(on_message::<DeletePolygonRequest>),
                    handle_nudge_polygon.run_if(on_message::<NudgePolygonRequest>),
                    process_draw_events,
                    tick_mode_notice,
                )
                    .chain()
                    .in_set(AnnotationUpdate)
                    .run_if(resource_exists::<Annotations>),
            );
    }
}
