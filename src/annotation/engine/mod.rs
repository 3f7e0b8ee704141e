//! Orchestrates the store, the drawing widget, the marker renderer, the mode
//! controller and persistence.
//!
//! Every mutation that changes persisted state ends with a save, and every
//! change to the polygon collection is followed by an area recompute. The
//! engine does nothing persistent until the widget has reported ready and the
//! saved snapshot (if any) has been replayed into it.


use std::time::Duration;

use bevy::log::{debug, info, warn};

use super::codec::{self, Decoded};
use super::error::{ExportError, ImportError};
use super::marker::{Marker, MarkerId, is_valid_coordinate};
use super::mode::{Mode, ModeController, ModeNotice};
use super::persistence::{AnnotationSnapshot, KeyValueStore, PersistenceAdapter};
use super::store::AnnotationStore;
use super::widget::{DrawMode, DrawingWidget, MarkerRenderer};

/// Startup progress of the engine.
#[derive(Debug)]
enum Readiness {
    /// `start` has not been called.
    Idle,
    /// Snapshot loaded (or absent), waiting for the widget.
    Waiting(Option<AnnotationSnapshot>),
    Ready,
}

/// A rendered export, ready to be written wherever the user chooses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
    pub marker_count: usize,
    pub polygon_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub markers: usize,
    pub polygons: usize,
    pub skipped: usize,
}

pub struct AnnotationEngine<W, R: MarkerRenderer, K> {
    store: AnnotationStore<R::Handle>,
    widget: W,
    renderer: R,
    persistence: PersistenceAdapter<K>,
    mode: ModeController,
    readiness: Readiness,
}

impl<W, R, K> AnnotationEngine<W, R, K>
where
    W: DrawingWidget,
    R: MarkerRenderer,
    K: KeyValueStore,
{
    pub fn new(widget: W, renderer: R, backend: K) -> Self {
        Self {
            store: AnnotationStore::default(),
            widget,
            renderer,
            persistence: PersistenceAdapter::new(backend),
            mode: ModeController::default(),
            readiness: Readiness::Idle,
        }
    }

    /// Loads the saved snapshot and holds it until the widget is ready.
    /// Calling it again after startup has begun does nothing.
    pub fn start(&mut self) {
        if !matches!(self.readiness, Readiness::Idle) {
            return;
        }
        self.readiness = Readiness::Waiting(self.persistence.load());
    }

    /// Replays the pending snapshot once the widget reports ready.
    /// Returns true on the call that completed startup.
    pub fn poll_ready(&mut self) -> bool {
        if !matches!(self.readiness, Readiness::Waiting(_)) || !self.widget.is_ready() {
            return false;
        }

        let pending = match std::mem::replace(&mut self.readiness, Readiness::Ready) {
            Readiness::Waiting(pending) => pending,
            _ => None,
        };
        if let Some(snapshot) = pending {
            self.restore(snapshot);
        }
        self.recompute_area();
        self.persist();
        info!(
            "Annotations ready: {} markers, {} polygons",
            self.store.len(),
            self.widget.collection().len()
        );
        true
    }

    fn restore(&mut self, snapshot: AnnotationSnapshot) {
        if !snapshot.polygons.is_empty() {
            self.widget.set(snapshot.polygons);
        }

        for marker in snapshot.markers {
            if !is_valid_coordinate(marker.lng, marker.lat) {
                warn!(
                    "Skipping saved marker {} at invalid position ({}, {})",
                    marker.id, marker.lng, marker.lat
                );
                continue;
            }
            self.store.restore_marker(marker, &mut self.renderer);
        }

        self.mode.restore(snapshot.mode, &mut self.widget);
        // Replaying is not a user edit
        self.widget.take_events();
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready)
    }

    /// Routes a click on the map. In marker mode with the widget idle this
    /// places a marker and returns it; in polygon mode the click becomes a
    /// vertex of the shape being drawn.
    pub fn handle_map_click(&mut self, lng: f64, lat: f64) -> Option<Marker> {
        if !self.is_ready() {
            debug!("Ignoring map click before annotations are ready");
            return None;
        }
        if !is_valid_coordinate(lng, lat) {
            debug!("Ignoring map click outside the world at ({}, {})", lng, lat);
            return None;
        }

        match self.mode.mode() {
            Mode::Marker => {
                if self.widget.mode() != DrawMode::SimpleSelect || self.widget.is_drawing() {
                    return None;
                }
                let marker = self.store.add_marker(lng, lat, &mut self.renderer);
                debug!("Added marker {} at ({:.6}, {:.6})", marker.id, lng, lat);
                self.persist();
                Some(marker)
            }
            Mode::Polygon => {
                self.widget.click(lng, lat);
                None
            }
        }
    }

    /// Selects the topmost polygon under the point, clearing the selection
    /// when nothing is hit.
    pub fn select_polygon_at(&mut self, lng: f64, lat: f64) -> bool {
        self.is_ready() && self.widget.select_at(lng, lat)
    }

    /// Drains widget notifications. Each batch triggers an area recompute
    /// followed by a save. Returns the number of batches handled.
    pub fn process_draw_events(&mut self) -> usize {
        let events = self.widget.take_events();
        if !self.is_ready() {
            return 0;
        }

        for event in &events {
            debug!(
                "Draw event '{}' with {} feature(s)",
                event.name(),
                event.features().len()
            );
            self.recompute_area();
            self.persist();
        }
        events.len()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode.set_mode(mode, &mut self.widget);
        info!("Mode set to {:?}", mode);
        // Leaving polygon mode may have committed a shape
        self.process_draw_events();
        self.persist();
    }

    /// Commits the shape being drawn, if it has enough vertices.
    /// Returns true when a polygon was created.
    pub fn finish_polygon(&mut self) -> bool {
        if self.widget.mode() != DrawMode::DrawPolygon {
            return false;
        }
        self.widget.change_mode(DrawMode::SimpleSelect);
        self.widget.change_mode(DrawMode::DrawPolygon);
        self.process_draw_events() > 0
    }

    /// Trashes the selected polygon, or abandons the shape being drawn.
    pub fn delete_selected_polygon(&mut self) -> bool {
        self.widget.trash();
        self.process_draw_events() > 0
    }

    pub fn nudge_selected_polygon(&mut self, dlng: f64, dlat: f64) -> bool {
        if !self.widget.translate_selected(dlng, dlat) {
            return false;
        }
        self.process_draw_events();
        true
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        let removed = self.store.remove_marker(id, &mut self.renderer);
        if removed {
            debug!("Removed marker {}", id);
            self.persist();
        }
        removed
    }

    pub fn select_marker(&mut self, id: MarkerId) -> bool {
        self.store.select_marker(id)
    }

    /// Removes every marker and polygon, returns to marker mode and deletes
    /// the saved slot. The slot stays absent until the next mutation.
    pub fn clear_all(&mut self) -> usize {
        if !self.is_ready() {
            return 0;
        }
        let removed = self.store.clear_markers(&mut self.renderer);
        self.widget.delete_all();
        self.mode.set_mode(Mode::Marker, &mut self.widget);
        self.widget.take_events();
        self.recompute_area();
        self.persistence.clear();
        info!("Cleared all annotations ({} markers)", removed);
        removed
    }

    pub fn export(&self) -> Result<ExportArtifact, ExportError> {
        let collection = codec::encode(self.store.markers(), self.widget.collection());
        let contents = codec::to_pretty_json(&collection)?;
        let artifact = ExportArtifact {
            file_name: codec::export_file_name(chrono::Utc::now().date_naive()),
            contents,
            marker_count: self.store.len(),
            polygon_count: self.widget.collection().len(),
        };
        info!(
            "Exported {} markers and {} polygons",
            artifact.marker_count, artifact.polygon_count
        );
        Ok(artifact)
    }

    /// Replaces all annotations with the contents of a GeoJSON document.
    ///
    /// The document is parsed and validated before anything is touched, so
    /// on error the current annotations and the saved slot are unchanged.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, ImportError> {
        if !self.is_ready() {
            return Err(ImportError::NotReady);
        }

        let Decoded {
            markers,
            polygons,
            skipped,
        } = codec::decode(codec::parse(text)?)?;

        self.store.clear_markers(&mut self.renderer);
        self.widget.delete_all();
        self.mode.restore(Mode::Marker, &mut self.widget);

        for [lng, lat] in &markers {
            self.store.add_marker(*lng, *lat, &mut self.renderer);
        }
        let offered = polygons.len();
        for feature in polygons {
            self.widget.add(feature);
        }
        self.widget.take_events();
        // Polygons sharing an id replace each other in the widget
        let installed = self.widget.collection().len();
        if installed < offered {
            warn!(
                "{} imported polygon(s) had a duplicate id and were dropped",
                offered - installed
            );
        }

        self.recompute_area();
        self.persist();

        let summary = ImportSummary {
            markers: markers.len(),
            polygons: installed,
            skipped: skipped + (offered - installed),
        };
        info!(
            "Imported {} markers and {} polygons ({} features skipped)",
            summary.markers, summary.polygons, summary.skipped
        );
        Ok(summary)
    }

    pub fn snapshot(&self) -> AnnotationSnapshot {
        AnnotationSnapshot {
            markers: self.store.markers().copied().collect(),
            polygons: self.widget.collection().clone(),
            area: self.store.area(),
            mode: self.mode.mode(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Saves the current state, if startup has finished.
    #[cfg(test)]
    pub fn save_snapshot(&mut self) {
        self.persist();
    }

    fn persist(&mut self) {
        if self.is_ready() {
            let snapshot = self.snapshot();
            self.persistence.save(&snapshot);
        }
    }

    fn recompute_area(&mut self) {
        self.store.recompute_area(self.widget.collection());
    }

    /// Advances the mode notice timer.
    pub fn tick(&mut self, delta: Duration) {
        self.mode.tick(delta);
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.store.markers()
    }

    pub fn marker_count(&self) -> usize {
        self.store.len()
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn mode_notice(&self) -> Option<&ModeNotice> {
        self.mode.notice()
    }

    pub fn area(&self) -> Option<f64> {
        self.store.area()
    }

    pub fn selected_marker(&self) -> Option<MarkerId> {
        self.store.selected()
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[cfg(test)]
    pub fn persistence(&self) -> &PersistenceAdapter<K> {
        &self.persistence
    }

    #[cfg(test)]
    pub fn persistence_mut(&mut self) -> &mut PersistenceAdapter<K> {
        &mut self.persistence
    }
}
