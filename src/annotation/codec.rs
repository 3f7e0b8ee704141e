//! GeoJSON export/import of the annotation set.
//!
//! Export order is fixed: one Point per marker in insertion order, then the
//! widget's polygons in widget order. Import keeps Points and Polygons and
//! silently skips every other geometry type (including null geometry); that
//! leniency is intentional so mixed files from other tools still load.

use chrono::NaiveDate;
use serde_json::Value;

use super::error::{ExportError, ImportError};
use super::geojson::{Feature, FeatureCollection, Geometry};
use super::marker::{Marker, is_valid_coordinate};

pub const MARKER_TAG: &str = "marker";
pub const POLYGON_TAG: &str = "polygon";

/// Result of decoding an imported collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    /// `[lng, lat]` of each Point, in file order.
    pub markers: Vec<[f64; 2]>,
    /// Polygon features, unchanged.
    pub polygons: Vec<Feature>,
    /// Features with any other (or no) geometry.
    pub skipped: usize,
}

pub fn encode<'a>(
    markers: impl IntoIterator<Item = &'a Marker>,
    polygons: &FeatureCollection,
) -> FeatureCollection {
    let marker_features = markers.into_iter().map(|marker| {
        let mut feature = Feature::point(marker.lng, marker.lat);
        feature
            .properties
            .insert("id".to_string(), Value::from(marker.id));
        feature
            .properties
            .insert("type".to_string(), Value::from(MARKER_TAG));
        feature
    });

    let polygon_features = polygons.features.iter().map(|feature| {
        let mut feature = feature.clone();
        feature
            .properties
            .insert("type".to_string(), Value::from(POLYGON_TAG));
        feature
    });

    FeatureCollection::new(marker_features.chain(polygon_features).collect())
}

/// Parses import text. Fails on malformed JSON, a missing `features` array,
/// or a feature that is not a valid GeoJSON object.
pub fn parse(text: &str) -> Result<FeatureCollection, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let Some(raw_features) = value.get("features").and_then(Value::as_array) else {
        return Err(ImportError::MissingFeatures);
    };

    let features = raw_features
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<Feature>(raw.clone()).map_err(|e| {
                ImportError::InvalidFeature {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection::new(features))
}

/// Splits a collection into marker requests and polygon features.
///
/// Point `id`/`type` properties are ignored since markers get fresh ids.
/// A Point without a valid lng/lat pair fails the whole decode.
pub fn decode(collection: FeatureCollection) -> Result<Decoded, ImportError> {
    let mut decoded = Decoded::default();

    for (index, feature) in collection.features.into_iter().enumerate() {
        match &feature.geometry {
            Some(Geometry::Point { coordinates }) => {
                let (lng, lat) = match coordinates.as_slice() {
                    [lng, lat, ..] => (*lng, *lat),
                    _ => {
                        return Err(ImportError::InvalidFeature {
                            index,
                            reason: "point needs [lng, lat] coordinates".to_string(),
                        });
                    }
                };
                if !is_valid_coordinate(lng, lat) {
                    return Err(ImportError::InvalidFeature {
                        index,
                        reason: format!("point ({}, {}) is outside lng/lat range", lng, lat),
                    });
                }
                decoded.markers.push([lng, lat]);
            }
            Some(Geometry::Polygon { .. }) => decoded.polygons.push(feature),
            Some(Geometry::Unsupported) | None => decoded.skipped += 1,
        }
    }

    Ok(decoded)
}

pub fn to_pretty_json(collection: &FeatureCollection) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// `map-data-YYYY-MM-DD.geojson`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("map-data-{}.geojson", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn marker(id: i64, lng: f64, lat: f64) -> Marker {
        Marker { id, lng, lat }
    }

    fn square(lng: f64, lat: f64) -> Feature {
        Feature::polygon(&[
            [lng, lat],
            [lng + 1.0, lat],
            [lng + 1.0, lat + 1.0],
            [lng, lat + 1.0],
        ])
    }

    #[test]
    fn test_encode_orders_markers_then_polygons() {
        let markers = [marker(1, 10.0, 20.0), marker(2, 11.0, 21.0)];
        let polygons = FeatureCollection::new(vec![square(0.0, 0.0), square(5.0, 5.0)]);

        let encoded = encode(&markers, &polygons);
        let tags: Vec<_> = encoded
            .features
            .iter()
            .map(|f| f.properties["type"].as_str().unwrap())
            .collect();
        assert_eq!(tags, ["marker", "marker", "polygon", "polygon"]);
        assert_eq!(encoded.features[0].properties["id"], json!(1));
        assert_eq!(encoded.features[1].properties["id"], json!(2));
        assert_eq!(encoded.features[2].geometry, polygons.features[0].geometry);
        assert_eq!(encoded.features[3].geometry, polygons.features[1].geometry);
    }

    #[test]
    fn test_encode_preserves_polygon_properties() {
        let mut polygon = square(0.0, 0.0).with_id("abc");
        polygon
            .properties
            .insert("name".to_string(), json!("field"));
        polygon
            .properties
            .insert("type".to_string(), json!("something-else"));

        let encoded = encode(&[], &FeatureCollection::new(vec![polygon]));
        let props = &encoded.features[0].properties;
        assert_eq!(props["name"], "field");
        assert_eq!(props["type"], "polygon");
        assert_eq!(encoded.features[0].id, Some(json!("abc")));
    }

    #[test]
    fn test_decode_partitions_and_skips_others() {
        let collection = parse(
            &json!({
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "geometry": { "type": "Point", "coordinates": [10.0, 20.0] },
                      "properties": { "id": 99, "type": "marker" } },
                    { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                      "properties": {} },
                    { "type": "Feature", "geometry": null, "properties": {} },
                    { "type": "Feature", "geometry": { "type": "Polygon",
                      "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]] },
                      "properties": { "type": "polygon" } }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let decoded = decode(collection).unwrap();
        assert_eq!(decoded.markers, vec![[10.0, 20.0]]);
        assert_eq!(decoded.polygons.len(), 1);
        assert_eq!(decoded.skipped, 2);
    }

    #[test]
    fn test_encode_decode_preserves_geometry() {
        let markers = [marker(1, 77.2, 28.6), marker(2, -3.5, 40.1)];
        let polygons = FeatureCollection::new(vec![square(0.0, 0.0)]);

        let text = to_pretty_json(&encode(&markers, &polygons)).unwrap();
        let decoded = decode(parse(&text).unwrap()).unwrap();

        assert_eq!(decoded.markers, vec![[77.2, 28.6], [-3.5, 40.1]]);
        assert_eq!(decoded.polygons.len(), 1);
        assert_eq!(decoded.polygons[0].geometry, polygons.features[0].geometry);

        let reencoded = encode(
            &decoded
                .markers
                .iter()
                .enumerate()
                .map(|(i, [lng, lat])| marker(i as i64, *lng, *lat))
                .collect::<Vec<_>>(),
            &FeatureCollection::new(decoded.polygons),
        );
        let geometries: Vec<_> = reencoded.features.iter().map(|f| &f.geometry).collect();
        let original = encode(&markers, &polygons);
        let original_geometries: Vec<_> = original.features.iter().map(|f| &f.geometry).collect();
        assert_eq!(geometries, original_geometries);
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(parse("{ nope"), Err(ImportError::Json(_))));
    }

    #[test]
    fn test_parse_rejects_missing_features() {
        assert!(matches!(
            parse(r#"{ "type": "FeatureCollection" }"#),
            Err(ImportError::MissingFeatures)
        ));
        assert!(matches!(
            parse(r#"{ "features": 3 }"#),
            Err(ImportError::MissingFeatures)
        ));
    }

    #[test]
    fn test_parse_reports_bad_feature_index() {
        let text = json!({
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": "oops" } }
            ]
        })
        .to_string();
        assert!(matches!(
            parse(&text),
            Err(ImportError::InvalidFeature { index: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_point() {
        let collection = FeatureCollection::new(vec![Feature::point(200.0, 10.0)]);
        assert!(matches!(
            decode(collection),
            Err(ImportError::InvalidFeature { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_short_point() {
        let collection = FeatureCollection::new(vec![Feature::new(Geometry::Point {
            coordinates: vec![1.0],
        })]);
        assert!(decode(collection).is_err());
    }

    #[test]
    fn test_decode_accepts_point_with_altitude() {
        let collection = FeatureCollection::new(vec![Feature::new(Geometry::Point {
            coordinates: vec![1.0, 2.0, 300.0],
        })]);
        assert_eq!(decode(collection).unwrap().markers, vec![[1.0, 2.0]]);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "map-data-2024-03-09.geojson");
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let text = to_pretty_json(&encode(&[marker(1, 0.0, 0.0)], &FeatureCollection::default()))
            .unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"FeatureCollection\""));
    }
}
