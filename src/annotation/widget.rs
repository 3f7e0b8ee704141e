//! Contracts for the collaborators the engine drives but does not implement:
//! the polygon drawing widget and the marker renderer.

use super::geojson::{Feature, FeatureCollection};
use super::marker::Marker;

/// Interaction mode of the drawing widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Idle/selection; map clicks are free for marker placement.
    #[default]
    SimpleSelect,
    /// Clicks add vertices to the polygon being drawn.
    DrawPolygon,
}

/// Notifications the widget emits when the user changes its features.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Create(Vec<Feature>),
    Update(Vec<Feature>),
    Delete(Vec<Feature>),
}

impl DrawEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DrawEvent::Create(_) => "create",
            DrawEvent::Update(_) => "update",
            DrawEvent::Delete(_) => "delete",
        }
    }

    pub fn features(&self) -> &[Feature] {
        match self {
            DrawEvent::Create(features)
            | DrawEvent::Update(features)
            | DrawEvent::Delete(features) => features,
        }
    }
}

/// The widget owns the polygon feature collection. Everything else only
/// reads it through [`DrawingWidget::collection`] and changes it through the
/// other methods.
///
/// Programmatic changes (`set`, `add`, `delete_all`) do not emit events;
/// user edits (drawing, trash, moving a shape) do.
pub trait DrawingWidget {
    fn collection(&self) -> &FeatureCollection;

    /// Replaces every feature.
    fn set(&mut self, collection: FeatureCollection);

    /// Adds a feature, replacing any existing feature with the same id.
    fn add(&mut self, feature: Feature);

    fn delete_all(&mut self);

    fn change_mode(&mut self, mode: DrawMode);

    fn mode(&self) -> DrawMode;

    /// True while a shape has been started but not finished.
    fn is_drawing(&self) -> bool;

    /// A map click routed to the widget.
    fn click(&mut self, lng: f64, lat: f64);

    /// Selects the topmost polygon under the point. Returns whether one was hit.
    fn select_at(&mut self, lng: f64, lat: f64) -> bool;

    /// Deletes the selection, or abandons the shape being drawn.
    fn trash(&mut self);

    /// Moves the selected polygon. Returns false when nothing is selected.
    fn translate_selected(&mut self, dlng: f64, dlat: f64) -> bool;

    /// True once the widget can accept features.
    fn is_ready(&self) -> bool;

    fn take_events(&mut self) -> Vec<DrawEvent>;
}

/// Displays markers. Each attached marker yields a handle that must be
/// released exactly once; `release` takes it by value.
pub trait MarkerRenderer {
    type Handle;

    fn attach(&mut self, marker: &Marker) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draw_mode_is_select() {
        assert_eq!(DrawMode::default(), DrawMode::SimpleSelect);
    }

    #[test]
    fn test_event_features() {
        let event = DrawEvent::Delete(vec![Feature::point(1.0, 2.0)]);
        assert_eq!(event.name(), "delete");
        assert_eq!(event.features().len(), 1);
    }
}
