//! GeoJSON validation
//!
//! Structural checks run on the raw JSON first so that failures can name the
//! offending feature. Geometries are then converted to `geo` types and checked
//! with [`geo::Validation`] for well-formedness.

use std::path::Path;

use geo::Validation;
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;

use crate::core::error::{Error, InvalidGeoJson, Result};
use crate::core::observer::RunObserver;

/// Read, parse and validate a GeoJSON FeatureCollection.
///
/// The first problem found aborts validation of the whole document and is
/// reported once to `observer` before being returned. On success the
/// collection is returned exactly as parsed.
pub fn validate_geojson(path: &Path, observer: &dyn RunObserver) -> Result<FeatureCollection> {
    let result = std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|text| parse_feature_collection(&text));

    if let Err(err) = &result {
        observer.error(&format!("❌ Error validating the GeoJSON: {err}"));
    }
    result
}

/// Validate GeoJSON text without touching the filesystem or any observer
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let raw: Value = serde_json::from_str(text)?;
    check_structure(&raw)?;

    let collection = match GeoJson::from_json_value(raw) {
        Ok(GeoJson::FeatureCollection(collection)) => collection,
        Ok(_) => return Err(InvalidGeoJson::NotFeatureCollection(None).into()),
        Err(err) => return Err(InvalidGeoJson::Malformed(err.to_string()).into()),
    };

    for (idx, feature) in collection.features.iter().enumerate() {
        let number = idx + 1;
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(InvalidGeoJson::MissingGeometry { feature: number })?;

        let shape = geo::Geometry::<f64>::try_from(geometry.value.clone())
            .map_err(|err| InvalidGeoJson::Malformed(format!("feature #{number}: {err}")))?;
        if !shape.is_valid() {
            return Err(InvalidGeoJson::IllFormedGeometry {
                feature: number,
                kind: geometry_kind(&geometry.value).to_string(),
            }
            .into());
        }
    }

    Ok(collection)
}

/// Short name of a geometry kind, as spelled in GeoJSON
pub fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn check_structure(raw: &Value) -> std::result::Result<(), InvalidGeoJson> {
    match raw.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        found => {
            return Err(InvalidGeoJson::NotFeatureCollection(
                found.map(str::to_string),
            ))
        }
    }

    let features = raw.get("features").ok_or(InvalidGeoJson::MissingFeatures)?;
    let features = features
        .as_array()
        .ok_or_else(|| InvalidGeoJson::Malformed("'features' is not an array".to_string()))?;

    for (idx, feature) in features.iter().enumerate() {
        let number = idx + 1;
        let geometry = match feature.get("geometry") {
            Some(geometry) if !geometry.is_null() => geometry,
            _ => return Err(InvalidGeoJson::MissingGeometry { feature: number }),
        };

        match geometry.get("coordinates").and_then(Value::as_array) {
            Some(coordinates) if !coordinates.is_empty() => {
                if !positions_are_usable(coordinates) {
                    return Err(InvalidGeoJson::ShortPosition { feature: number });
                }
            }
            _ => return Err(InvalidGeoJson::InvalidCoordinates { feature: number }),
        }
    }

    Ok(())
}

/// Every leaf position must hold at least a finite longitude and latitude.
/// Nested arrays (rings, lines) must be non-empty.
fn positions_are_usable(items: &[Value]) -> bool {
    if items.iter().all(Value::is_number) {
        return items.len() >= 2
            && items
                .iter()
                .all(|n| n.as_f64().is_some_and(f64::is_finite));
    }

    items.iter().all(|item| match item.as_array() {
        Some(nested) => !nested.is_empty() && positions_are_usable(nested),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::RecordingObserver;
    use tempfile::tempdir;

    const LINE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Línea 12" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-66.1568, -17.3935, 2558.0], [-66.1552, -17.3920], [-66.1540, -17.3911]]
                }
            }
        ]
    }"#;

    fn invalid_reason(text: &str) -> InvalidGeoJson {
        match parse_feature_collection(text) {
            Err(Error::InvalidGeoJson(reason)) => reason,
            other => panic!("Expected InvalidGeoJson, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_collection_is_returned_unchanged() {
        let collection = parse_feature_collection(LINE).unwrap();

        let expected: GeoJson = LINE.parse().unwrap();
        assert_eq!(GeoJson::FeatureCollection(collection.clone()), expected);

        let geometry = collection.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            geojson::Value::LineString(positions) => {
                assert_eq!(positions[0], vec![-66.1568, -17.3935, 2558.0]);
            }
            other => panic!("Expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_feature_list_is_valid() {
        let collection =
            parse_feature_collection(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn test_rejects_other_top_level_types() {
        assert_eq!(
            invalid_reason(r#"{"type": "Feature", "features": []}"#),
            InvalidGeoJson::NotFeatureCollection(Some("Feature".to_string()))
        );
        assert_eq!(
            invalid_reason(r#"{"features": []}"#),
            InvalidGeoJson::NotFeatureCollection(None)
        );
    }

    #[test]
    fn test_rejects_missing_features() {
        assert_eq!(
            invalid_reason(r#"{"type": "FeatureCollection"}"#),
            InvalidGeoJson::MissingFeatures
        );
    }

    #[test]
    fn test_rejects_missing_or_null_geometry() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]}"#;
        assert_eq!(invalid_reason(text), InvalidGeoJson::MissingGeometry { feature: 2 });

        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null}
        ]}"#;
        assert_eq!(invalid_reason(text), InvalidGeoJson::MissingGeometry { feature: 1 });
    }

    #[test]
    fn test_rejects_empty_coordinates() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "LineString", "coordinates": []}}
        ]}"#;
        assert_eq!(invalid_reason(text), InvalidGeoJson::InvalidCoordinates { feature: 1 });
    }

    #[test]
    fn test_rejects_positions_without_latitude() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "LineString", "coordinates": [[1.0, 2.0], [3.0]]}}
        ]}"#;
        assert_eq!(invalid_reason(text), InvalidGeoJson::ShortPosition { feature: 1 });
    }

    #[test]
    fn test_rejects_self_intersecting_polygon() {
        // Bow-tie ring crosses itself between the second and fourth vertex
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": null, "geometry": {"type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]}}
        ]}"#;
        assert_eq!(
            invalid_reason(text),
            InvalidGeoJson::IllFormedGeometry { feature: 1, kind: "Polygon".to_string() }
        );
    }

    #[test]
    fn test_rejects_invalid_json() {
        match parse_feature_collection("{ not json") {
            Err(Error::JsonError(_)) => {}
            other => panic!("Expected JsonError, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_geojson_reports_one_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("route.geojson");
        std::fs::write(&path, r#"{"type": "FeatureCollection"}"#).unwrap();

        let observer = RecordingObserver::new();
        assert!(validate_geojson(&path, &observer).is_err());

        let errors = observer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'features' key is missing"), "{errors:?}");
    }

    #[test]
    fn test_validate_geojson_success_is_silent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("route.geojson");
        std::fs::write(&path, LINE).unwrap();

        let observer = RecordingObserver::new();
        let collection = validate_geojson(&path, &observer).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert!(observer.entries().is_empty());
    }
}
