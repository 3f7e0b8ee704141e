//! Minimal GeoJSON model used for the widget's polygon set, the persisted
//! snapshot and the export/import format.
//!
//! Only `Point` and `Polygon` geometries carry data. Any other geometry type
//! parses as [`Geometry::Unsupported`] so that a file containing, say, a
//! `LineString` still loads and the unsupported feature is skipped later.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `[lng, lat]`, optionally followed by extra ordinates (altitude) we ignore.
pub type Position = Vec<f64>;

/// A closed ring of positions (first == last).
pub type Ring = Vec<Position>;

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureKind {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectionKind {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Ring> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub kind: FeatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: FeatureKind::Feature,
            id: None,
            geometry: Some(geometry),
            properties: Properties::new(),
        }
    }

    pub fn point(lng: f64, lat: f64) -> Self {
        Self::new(Geometry::Point {
            coordinates: vec![lng, lat],
        })
    }

    /// Builds a single-ring polygon, closing the ring if needed.
    pub fn polygon(vertices: &[[f64; 2]]) -> Self {
        let mut ring: Ring = vertices.iter().map(|v| vec![v[0], v[1]]).collect();
        if let (Some(first), Some(last)) = (ring.first(), ring.last())
            && first != last
        {
            ring.push(first.clone());
        }
        Self::new(Geometry::Polygon {
            coordinates: vec![ring],
        })
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The `id` as a lookup key: strings as they are, numbers in their
    /// JSON spelling. Other id values have no key.
    pub fn id_key(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionKind::FeatureCollection,
            features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_serializes_type_tags() {
        let collection = FeatureCollection::new(vec![Feature::point(1.0, 2.0)]);
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
    }

    #[test]
    fn test_null_properties_read_as_empty() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [3.0, 4.0] },
            "properties": null
        }))
        .unwrap();
        assert!(feature.properties.is_empty());
    }

    #[test]
    fn test_unknown_geometry_is_unsupported() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
            "properties": {}
        }))
        .unwrap();
        assert_eq!(feature.geometry, Some(Geometry::Unsupported));
    }

    #[test]
    fn test_null_geometry_is_none() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null
        }))
        .unwrap();
        assert!(feature.geometry.is_none());
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let feature = Feature::polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        let Some(Geometry::Polygon { coordinates }) = &feature.geometry else {
            panic!("expected polygon");
        };
        assert_eq!(coordinates[0].len(), 4);
        assert_eq!(coordinates[0].first(), coordinates[0].last());
    }

    #[test]
    fn test_id_key() {
        let feature = Feature::point(0.0, 0.0).with_id("abc");
        assert_eq!(feature.id_key().as_deref(), Some("abc"));
        assert_eq!(Feature::point(0.0, 0.0).with_id(7).id_key().as_deref(), Some("7"));
        assert_eq!(Feature::point(0.0, 0.0).with_id(true).id_key(), None);
        assert_eq!(Feature::point(0.0, 0.0).id_key(), None);
    }

    #[test]
    fn test_id_omitted_when_absent() {
        let value = serde_json::to_value(Feature::point(0.0, 0.0)).unwrap();
        assert!(value.get("id").is_none());
    }
}
