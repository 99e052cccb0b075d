use crate::error::{AnalysisError, Result};
use crate::models::Crs;
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;

/// Parse a GeoJSON document into its features and declared CRS
pub fn parse_feature_collection(text: &str) -> Result<(Crs, Vec<Feature>)> {
    let geojson: GeoJson = text.parse()?;

    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => {
            return Err(AnalysisError::InvalidFormat(
                "expected a FeatureCollection, found a bare geometry".to_string(),
            ))
        }
    };

    let crs = declared_crs(&collection)?;
    Ok((crs, collection.features))
}

/// Honour the legacy `crs` member; RFC 7946 files without one are WGS84
fn declared_crs(collection: &FeatureCollection) -> Result<Crs> {
    let name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(Value::as_str);

    match name {
        Some(name) => Crs::from_name(name),
        None => Ok(Crs::Wgs84),
    }
}

/// Polygonal geometry of a feature, `None` for anything else
pub fn feature_multipolygon(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry.clone()?;
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;

    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}

/// String form of a property; numbers are stringified, null is `None`
pub fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
