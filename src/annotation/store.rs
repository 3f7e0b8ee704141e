//! The authoritative in-process annotation model.
//!
//! Owns the ordered marker list (each with its render handle), the selected
//! marker, and the derived polygon area. The polygon collection itself is
//! owned by the drawing widget and only read here.

use super::geojson::FeatureCollection;
use super::geometry::rounded_area;
use super::marker::{Marker, MarkerId, MarkerIdGenerator};
use super::widget::MarkerRenderer;

struct Entry<H> {
    marker: Marker,
    handle: H,
}

pub struct AnnotationStore<H> {
    entries: Vec<Entry<H>>,
    ids: MarkerIdGenerator,
    selected: Option<MarkerId>,
    area: Option<f64>,
}

impl<H> Default for AnnotationStore<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            ids: MarkerIdGenerator::default(),
            selected: None,
            area: None,
        }
    }
}

impl<H> AnnotationStore<H> {
    pub fn add_marker<R>(&mut self, lng: f64, lat: f64, renderer: &mut R) -> Marker
    where
        R: MarkerRenderer<Handle = H>,
    {
        let marker = Marker {
            id: self.fresh_id(),
            lng,
            lat,
        };
        self.insert(marker, renderer);
        marker
    }

    /// A clock id when one is still available, else the smallest
    /// non-negative id nobody holds.
    fn fresh_id(&mut self) -> MarkerId {
        if let Some(id) = self.ids.next_id() {
            return id;
        }
        (0..)
            .find(|id| self.get(*id).is_none())
            .unwrap_or(MarkerId::MIN)
    }

    /// Re-inserts a persisted marker. Keeps its id unless that id is already
    /// taken, in which case a fresh one is assigned.
    pub fn restore_marker<R>(&mut self, marker: Marker, renderer: &mut R) -> Marker
    where
        R: MarkerRenderer<Handle = H>,
    {
        let marker = if self.get(marker.id).is_some() {
            Marker {
                id: self.fresh_id(),
                ..marker
            }
        } else {
            self.ids.observe(marker.id);
            marker
        };
        self.insert(marker, renderer);
        marker
    }

    fn insert<R>(&mut self, marker: Marker, renderer: &mut R)
    where
        R: MarkerRenderer<Handle = H>,
    {
        let handle = renderer.attach(&marker);
        self.entries.push(Entry { marker, handle });
    }

    /// Removes the marker and releases its handle. Returns false when no
    /// marker has that id.
    pub fn remove_marker<R>(&mut self, id: MarkerId, renderer: &mut R) -> bool
    where
        R: MarkerRenderer<Handle = H>,
    {
        let Some(index) = self.entries.iter().position(|e| e.marker.id == id) else {
            return false;
        };

        let entry = self.entries.remove(index);
        renderer.release(entry.handle);
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Removes every marker, releasing each handle. Returns how many were removed.
    pub fn clear_markers<R>(&mut self, renderer: &mut R) -> usize
    where
        R: MarkerRenderer<Handle = H>,
    {
        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            renderer.release(entry.handle);
        }
        self.selected = None;
        count
    }

    /// Recomputes and stores the area of `collection`.
    pub fn recompute_area(&mut self, collection: &FeatureCollection) -> Option<f64> {
        self.area = rounded_area(collection);
        self.area
    }

    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn select_marker(&mut self, id: MarkerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn selected(&self) -> Option<MarkerId> {
        self.selected
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers().find(|marker| marker.id == id)
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.entries.iter().map(|entry| &entry.marker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::annotation::geojson::Feature;
    use crate::annotation::test_support::RecordingRenderer;

    fn ids(store: &AnnotationStore<u64>) -> Vec<MarkerId> {
        store.markers().map(|m| m.id).collect()
    }

    #[test]
    fn test_add_then_remove_first() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();

        let first = store.add_marker(77.2, 28.6, &mut renderer);
        let second = store.add_marker(77.3, 28.7, &mut renderer);
        assert_eq!(store.len(), 2);
        assert_ne!(first.id, second.id);

        assert!(store.remove_marker(first.id, &mut renderer));
        assert_eq!(store.len(), 1);
        assert_eq!(store.markers().next(), Some(&second));
    }

    #[test]
    fn test_remove_unknown_id_is_false() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        store.add_marker(1.0, 1.0, &mut renderer);
        assert!(!store.remove_marker(-5, &mut renderer));
        assert_eq!(store.len(), 1);
        assert!(renderer.released.is_empty());
    }

    #[test]
    fn test_ids_unique_and_ordered_through_add_remove_sequence() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let mut expected = Vec::new();

        for i in 0..50 {
            let marker = store.add_marker(i as f64 * 0.1, 10.0, &mut renderer);
            expected.push(marker.id);
            if i % 3 == 0 {
                let victim = expected.remove(expected.len() / 2);
                assert!(store.remove_marker(victim, &mut renderer));
            }
        }

        let actual = ids(&store);
        assert_eq!(actual, expected);
        let unique: HashSet<_> = actual.iter().collect();
        assert_eq!(unique.len(), actual.len());
    }

    #[test]
    fn test_handles_released_exactly_once() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let a = store.add_marker(1.0, 1.0, &mut renderer);
        store.add_marker(2.0, 2.0, &mut renderer);
        store.add_marker(3.0, 3.0, &mut renderer);

        store.remove_marker(a.id, &mut renderer);
        store.remove_marker(a.id, &mut renderer);
        assert_eq!(store.clear_markers(&mut renderer), 2);
        assert_eq!(store.clear_markers(&mut renderer), 0);

        let mut released = renderer.released.clone();
        released.sort_unstable();
        assert_eq!(released, vec![0, 1, 2]);
        assert!(renderer.live().is_empty());
    }

    #[test]
    fn test_restore_keeps_id_and_advances_generator() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let far_future = chrono::Utc::now().timestamp_millis() + 1_000_000;

        let restored = store.restore_marker(
            Marker {
                id: far_future,
                lng: 5.0,
                lat: 6.0,
            },
            &mut renderer,
        );
        assert_eq!(restored.id, far_future);

        let fresh = store.add_marker(0.0, 0.0, &mut renderer);
        assert!(fresh.id > far_future);
    }

    #[test]
    fn test_restore_duplicate_id_gets_fresh_id() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let marker = Marker {
            id: 1_000,
            lng: 1.0,
            lat: 1.0,
        };
        store.restore_marker(marker, &mut renderer);
        let second = store.restore_marker(marker, &mut renderer);
        assert_ne!(second.id, 1_000);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_ids_stay_unique_after_max_id_restored() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let top = Marker {
            id: MarkerId::MAX,
            lng: 1.0,
            lat: 1.0,
        };
        store.restore_marker(top, &mut renderer);
        let duplicate = store.restore_marker(top, &mut renderer);
        let a = store.add_marker(2.0, 2.0, &mut renderer);
        let b = store.add_marker(3.0, 3.0, &mut renderer);

        assert_eq!(duplicate.id, 0);
        assert_eq!((a.id, b.id), (1, 2));
        let all = ids(&store);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(all.contains(&MarkerId::MAX));
    }

    #[test]
    fn test_selection_cleared_on_remove() {
        let mut renderer = RecordingRenderer::default();
        let mut store = AnnotationStore::default();
        let marker = store.add_marker(1.0, 1.0, &mut renderer);

        assert!(!store.select_marker(marker.id + 1));
        assert!(store.select_marker(marker.id));
        assert_eq!(store.selected(), Some(marker.id));

        store.remove_marker(marker.id, &mut renderer);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_recompute_area_empty_is_none() {
        let mut store = AnnotationStore::<u64>::default();
        assert_eq!(store.recompute_area(&FeatureCollection::default()), None);
        assert_eq!(store.area(), None);
    }

    #[test]
    fn test_recompute_area_with_polygon() {
        let mut store = AnnotationStore::<u64>::default();
        let collection = FeatureCollection::new(vec![Feature::polygon(&[
            [77.2, 28.6],
            [77.21, 28.6],
            [77.21, 28.61],
            [77.2, 28.61],
        ])]);
        let area = store.recompute_area(&collection).unwrap();
        assert!(area > 0.0);
        assert_eq!(store.area(), Some(area));
    }
}
