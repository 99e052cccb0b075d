use crate::error::{AnalysisError, Result};
use crate::models::{Complaint, Layer, NeighborhoodStats, Park};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes analysis layers as RFC 7946 FeatureCollections.
///
/// Properties are emitted in key order and features in layer order, so the
/// same inputs always produce the same bytes.
pub struct GeoJsonWriter;

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self
    }

    /// Complaint points with their record attributes and park distance
    pub fn write_complaints(
        &self,
        complaints: &Layer<Complaint>,
        distances: &[Option<f64>],
        path: &Path,
    ) -> Result<()> {
        if distances.len() != complaints.len() {
            return Err(AnalysisError::InvalidFormat(format!(
                "{} distances for {} complaints",
                distances.len(),
                complaints.len()
            )));
        }

        let features = complaints
            .iter()
            .zip(distances)
            .map(|(complaint, distance)| {
                let record = &complaint.record;
                let mut properties = JsonObject::new();
                properties.insert("unique_key".into(), json!(record.unique_key));
                properties.insert(
                    "created_date".into(),
                    json!(record
                        .created_date
                        .map(|d| d.format(TIMESTAMP_FORMAT).to_string())),
                );
                properties.insert("complaint_type".into(), json!(record.complaint_type));
                properties.insert("descriptor".into(), json!(record.descriptor));
                properties.insert("city".into(), json!(record.city));
                properties.insert("community_board".into(), json!(record.community_board));
                properties.insert("borough".into(), json!(record.borough));
                properties.insert("latitude".into(), json!(record.latitude));
                properties.insert("longitude".into(), json!(record.longitude));
                properties.insert("park_distance_m".into(), number(*distance));

                feature(Geometry::new((&complaint.location).into()), properties)
            })
            .collect();

        self.write_collection(features, path)
    }

    /// Every NTA polygon with its counts, rate and mean park distance
    pub fn write_neighborhoods(&self, stats: &[NeighborhoodStats], path: &Path) -> Result<()> {
        let features = stats
            .iter()
            .map(|row| {
                let mut properties = JsonObject::new();
                properties.insert("ntacode".into(), json!(row.code));
                properties.insert("ntaname".into(), json!(row.name));
                properties.insert("borough".into(), json!(row.borough));
                properties.insert("complaints".into(), json!(row.complaint_count));
                properties.insert("population".into(), json!(row.population));
                properties.insert("rate".into(), number(Some(row.rate)));
                properties.insert("mean_park_distance".into(), number(row.mean_park_distance));

                feature(Geometry::new((&row.geometry).into()), properties)
            })
            .collect();

        self.write_collection(features, path)
    }

    pub fn write_parks(&self, parks: &Layer<Park>, path: &Path) -> Result<()> {
        let features = parks
            .iter()
            .map(|park| {
                let mut properties = JsonObject::new();
                properties.insert("category".into(), json!(park.category));
                properties.insert("name".into(), json!(park.name));
                properties.insert("repaired".into(), json!(park.repaired));

                feature(Geometry::new((&park.geometry).into()), properties)
            })
            .collect();

        self.write_collection(features, path)
    }

    fn write_collection(&self, features: Vec<Feature>, path: &Path) -> Result<()> {
        let count = features.len();
        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };

        // File::create truncates, so every export fully replaces the old file
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &collection)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!(path = %path.display(), features = count, "Wrote GeoJSON");
        Ok(())
    }
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Finite numbers only; anything else is written as null
fn number(value: Option<f64>) -> Value {
    value
        .filter(|v| v.is_finite())
        .map(|v| json!(v))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplaintRecord;
    use crate::readers::geojson_support::{parse_feature_collection, string_property};
    use geo::{polygon, MultiPolygon, Point};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn stats_row(code: &str, count: u64, population: Option<u64>, rate: f64) -> NeighborhoodStats {
        NeighborhoodStats {
            code: code.to_string(),
            name: format!("{code} name"),
            borough: "Manhattan".to_string(),
            complaint_count: count,
            population,
            rate,
            mean_park_distance: None,
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]]),
        }
    }

    #[test]
    fn test_write_neighborhoods() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nta.geojson");

        let rows = vec![
            stats_row("MN12", 10, Some(5000), 2.0),
            stats_row("BK09", 0, None, 0.0),
        ];
        GeoJsonWriter::new().write_neighborhoods(&rows, &path)?;

        let (_, features) = parse_feature_collection(&std::fs::read_to_string(&path)?)?;
        assert_eq!(features.len(), 2);
        assert_eq!(string_property(&features[0], "ntacode").as_deref(), Some("MN12"));
        assert_eq!(features[0].property("rate"), Some(&json!(2.0)));
        assert_eq!(features[1].property("complaints"), Some(&json!(0)));
        assert_eq!(features[1].property("population"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_write_complaints_is_deterministic() -> Result<()> {
        let dir = TempDir::new()?;
        let complaints = Layer::wgs84(vec![Complaint {
            record: ComplaintRecord {
                unique_key: "41000001".to_string(),
                created_date: crate::readers::parse_created_date("07/04/2019 03:15:22 PM"),
                complaint_type: "Noise - Vehicle".to_string(),
                descriptor: "Noise, Ice Cream Truck (NR4)".to_string(),
                city: "NEW YORK".to_string(),
                community_board: "12 MANHATTAN".to_string(),
                borough: "MANHATTAN".to_string(),
                latitude: Some(40.85),
                longitude: Some(-73.93),
            },
            location: Point::new(-73.93, 40.85),
        }]);

        let first = dir.path().join("a.geojson");
        let second = dir.path().join("b.geojson");
        let writer = GeoJsonWriter::new();
        writer.write_complaints(&complaints, &[Some(12.5)], &first)?;
        writer.write_complaints(&complaints, &[Some(12.5)], &second)?;

        let text = std::fs::read_to_string(&first)?;
        assert_eq!(text, std::fs::read_to_string(&second)?);
        assert!(text.contains("\"created_date\": \"2019-07-04T15:15:22\""));
        assert!(text.contains("\"park_distance_m\": 12.5"));
        Ok(())
    }

    #[test]
    fn test_misaligned_distances_rejected() {
        let dir = TempDir::new().unwrap();
        let empty: Layer<Complaint> = Layer::wgs84(vec![]);
        let result =
            GeoJsonWriter::new().write_complaints(&empty, &[Some(1.0)], &dir.path().join("x.geojson"));
        assert!(matches!(result, Err(AnalysisError::InvalidFormat(_))));
    }
}
