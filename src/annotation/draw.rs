//! In-process polygon drawing widget.
//!
//! Holds the polygon feature collection, the vertices of the shape being
//! drawn, and the selected shape. User edits queue [`DrawEvent`]s that the
//! engine drains each frame.

use serde_json::Value;

use super::geojson::{Feature, FeatureCollection, Geometry};
use super::geometry::polygon_contains;
use super::widget::{DrawEvent, DrawMode, DrawingWidget};

/// Minimum vertices for a shape to be committed as a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

#[derive(Debug, Default)]
pub struct PolygonDraw {
    collection: FeatureCollection,
    mode: DrawMode,
    pending: Vec<[f64; 2]>,
    selected: Option<String>,
    events: Vec<DrawEvent>,
    ready: bool,
}

impl PolygonDraw {
    /// Signals that the map view exists and features can be shown.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Vertices of the shape currently being drawn.
    pub fn pending_vertices(&self) -> &[[f64; 2]] {
        &self.pending
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn commit_pending(&mut self) {
        let vertices = std::mem::take(&mut self.pending);
        if vertices.len() < MIN_POLYGON_VERTICES {
            return;
        }

        let feature = Feature::polygon(&vertices).with_id(new_feature_id());
        self.collection.features.push(feature.clone());
        self.events.push(DrawEvent::Create(vec![feature]));
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.collection
            .features
            .iter()
            .position(|feature| feature.id_key().as_deref() == Some(id))
    }
}

fn new_feature_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Features without a usable id get a fresh one so they can be selected.
/// String and numeric ids are kept as they are.
fn with_feature_id(mut feature: Feature) -> Feature {
    if feature.id_key().is_none() {
        feature.id = Some(Value::String(new_feature_id()));
    }
    feature
}

impl DrawingWidget for PolygonDraw {
    fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    fn set(&mut self, collection: FeatureCollection) {
        self.collection = FeatureCollection::new(
            collection.features.into_iter().map(with_feature_id).collect(),
        );
        self.selected = None;
    }

    fn add(&mut self, feature: Feature) {
        let feature = with_feature_id(feature);
        match feature.id_key().and_then(|id| self.position_of(&id)) {
            Some(index) => self.collection.features[index] = feature,
            None => self.collection.features.push(feature),
        }
    }

    fn delete_all(&mut self) {
        self.collection.features.clear();
        self.pending.clear();
        self.selected = None;
    }

    fn change_mode(&mut self, mode: DrawMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == DrawMode::DrawPolygon {
            self.commit_pending();
        }
        if mode == DrawMode::DrawPolygon {
            self.selected = None;
        }
        self.mode = mode;
    }

    fn mode(&self) -> DrawMode {
        self.mode
    }

    fn is_drawing(&self) -> bool {
        self.mode == DrawMode::DrawPolygon && !self.pending.is_empty()
    }

    fn click(&mut self, lng: f64, lat: f64) {
        if self.mode == DrawMode::DrawPolygon {
            self.pending.push([lng, lat]);
        }
    }

    fn select_at(&mut self, lng: f64, lat: f64) -> bool {
        let hit = self.collection.features.iter().rev().find_map(|feature| {
            match &feature.geometry {
                Some(Geometry::Polygon { coordinates })
                    if polygon_contains(coordinates, lng, lat) =>
                {
                    feature.id_key()
                }
                _ => None,
            }
        });
        let found = hit.is_some();
        self.selected = hit;
        found
    }

    fn trash(&mut self) {
        if self.is_drawing() {
            self.pending.clear();
            return;
        }

        let Some(id) = self.selected.take() else {
            return;
        };
        if let Some(index) = self.position_of(&id) {
            let removed = self.collection.features.remove(index);
            self.events.push(DrawEvent::Delete(vec![removed]));
        }
    }

    fn translate_selected(&mut self, dlng: f64, dlat: f64) -> bool {
        let Some(index) = self.selected.as_deref().and_then(|id| self.position_of(id)) else {
            return false;
        };

        let feature = &mut self.collection.features[index];
        let Some(Geometry::Polygon { coordinates }) = &mut feature.geometry else {
            return false;
        };
        for position in coordinates.iter_mut().flatten() {
            if position.len() >= 2 {
                position[0] += dlng;
                position[1] += dlat;
            }
        }

        let updated = feature.clone();
        self.events.push(DrawEvent::Update(vec![updated]));
        true
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }
}
