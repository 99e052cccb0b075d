use crate::error::{AnalysisError, Result};
use crate::models::NeighborhoodStats;
use crate::readers::geojson_support::{
    feature_multipolygon, parse_feature_collection, string_property,
};
use crate::utils::coordinates::haversine_distance;
use geo::BoundingRect;
use std::path::Path;

const TOP_NEIGHBORHOODS: usize = 5;

#[derive(Debug)]
pub struct AtlasStatistics {
    pub neighborhoods: usize,
    pub total_complaints: u64,
    pub with_complaints: usize,
    pub with_population: usize,
    pub rate_stats: RateStats,
    pub distance_coverage: DistanceCoverage,
    pub geographic_bounds: Option<GeographicBounds>,
    /// (code, name, rate, complaints), highest rate first
    pub top_by_rate: Vec<(String, String, f64, u64)>,
}

#[derive(Debug)]
pub struct RateStats {
    pub min_rate: f64,
    pub max_rate: f64,
    pub mean_rate: f64,
}

#[derive(Debug)]
pub struct DistanceCoverage {
    /// NTAs with a mean park distance
    pub covered: usize,
    pub mean_distance: Option<f64>,
}

#[derive(Debug)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeographicBounds {
    /// Corner-to-corner extent in kilometres
    pub fn diagonal_km(&self) -> f64 {
        haversine_distance(self.min_lat, self.min_lon, self.max_lat, self.max_lon) / 1000.0
    }
}

pub struct AtlasAnalyzer;

impl AtlasAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Summarize a previously exported NTA GeoJSON
    pub fn analyze_geojson(&self, path: &Path) -> Result<AtlasStatistics> {
        let text = std::fs::read_to_string(path)?;
        let (_, features) = parse_feature_collection(&text)?;

        let mut rows = Vec::with_capacity(features.len());
        for (index, feature) in features.iter().enumerate() {
            let code = string_property(feature, "ntacode").ok_or_else(|| {
                AnalysisError::MissingData(format!("feature {} has no ntacode", index))
            })?;
            let number = |key: &str| feature.property(key).and_then(|v| v.as_f64());

            rows.push(NeighborhoodStats {
                name: string_property(feature, "ntaname").unwrap_or_default(),
                borough: string_property(feature, "borough").unwrap_or_default(),
                complaint_count: feature
                    .property("complaints")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0),
                population: feature.property("population").and_then(|v| v.as_u64()),
                rate: number("rate").unwrap_or(0.0),
                mean_park_distance: number("mean_park_distance"),
                geometry: feature_multipolygon(feature).unwrap_or_else(|| geo::MultiPolygon::new(vec![])),
                code,
            });
        }

        Ok(self.analyze(&rows))
    }

    pub fn analyze(&self, stats: &[NeighborhoodStats]) -> AtlasStatistics {
        let rates: Vec<f64> = stats.iter().map(|s| s.rate).filter(|r| r.is_finite()).collect();
        let rate_stats = if rates.is_empty() {
            RateStats {
                min_rate: f64::NAN,
                max_rate: f64::NAN,
                mean_rate: f64::NAN,
            }
        } else {
            RateStats {
                min_rate: rates.iter().copied().fold(f64::INFINITY, f64::min),
                max_rate: rates.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                mean_rate: rates.iter().sum::<f64>() / rates.len() as f64,
            }
        };

        let distances: Vec<f64> = stats.iter().filter_map(|s| s.mean_park_distance).collect();
        let distance_coverage = DistanceCoverage {
            covered: distances.len(),
            mean_distance: (!distances.is_empty())
                .then(|| distances.iter().sum::<f64>() / distances.len() as f64),
        };

        let geographic_bounds = stats
            .iter()
            .filter_map(|s| s.geometry.bounding_rect())
            .map(|rect| GeographicBounds {
                min_lat: rect.min().y,
                max_lat: rect.max().y,
                min_lon: rect.min().x,
                max_lon: rect.max().x,
            })
            .reduce(|a, b| GeographicBounds {
                min_lat: a.min_lat.min(b.min_lat),
                max_lat: a.max_lat.max(b.max_lat),
                min_lon: a.min_lon.min(b.min_lon),
                max_lon: a.max_lon.max(b.max_lon),
            });

        let mut ranked: Vec<&NeighborhoodStats> =
            stats.iter().filter(|s| s.complaint_count > 0).collect();
        ranked.sort_by(|a, b| b.rate.total_cmp(&a.rate).then_with(|| a.code.cmp(&b.code)));
        let top_by_rate = ranked
            .into_iter()
            .take(TOP_NEIGHBORHOODS)
            .map(|s| (s.code.clone(), s.name.clone(), s.rate, s.complaint_count))
            .collect();

        AtlasStatistics {
            neighborhoods: stats.len(),
            total_complaints: stats.iter().map(|s| s.complaint_count).sum(),
            with_complaints: stats.iter().filter(|s| s.complaint_count > 0).count(),
            with_population: stats.iter().filter(|s| s.population.is_some()).count(),
            rate_stats,
            distance_coverage,
            geographic_bounds,
            top_by_rate,
        }
    }
}

impl AtlasStatistics {
    pub fn summary(&self) -> String {
        let rate_range = if self.rate_stats.min_rate.is_nan() {
            "No rates".to_string()
        } else {
            format!(
                "{:.2} to {:.2} per 1,000 (mean {:.2})",
                self.rate_stats.min_rate, self.rate_stats.max_rate, self.rate_stats.mean_rate
            )
        };

        let coverage = match &self.geographic_bounds {
            Some(b) => format!(
                "{:.3}°N-{:.3}°N, {:.3}°W-{:.3}°W ({:.1} km across)",
                b.min_lat,
                b.max_lat,
                b.min_lon.abs(),
                b.max_lon.abs(),
                b.diagonal_km()
            ),
            None => "No geometry".to_string(),
        };

        format!(
            "NTAs: {} ({} with complaints, {} with population)\n\
            Complaints: {} total\n\
            Rate Range: {}\n\
            Coverage: {}",
            self.neighborhoods,
            self.with_complaints,
            self.with_population,
            self.total_complaints,
            rate_range,
            coverage
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut top = String::new();
        for (i, (code, name, rate, count)) in self.top_by_rate.iter().enumerate() {
            top.push_str(&format!(
                "\n{}. {} {}: {:.2} per 1,000 ({} complaints)",
                i + 1,
                code,
                name,
                rate,
                count
            ));
        }
        if top.is_empty() {
            top.push_str("\nNo NTA has complaints");
        }

        let distance = match self.distance_coverage.mean_distance {
            Some(mean) => format!("{:.0} m", mean),
            None => "n/a".to_string(),
        };

        format!(
            "{}\n\n\
            Highest Rates:{}\n\n\
            Park Proximity:\n\
            - NTAs with a mean distance: {}/{}\n\
            - Average of NTA means: {}",
            self.summary(),
            top,
            self.distance_coverage.covered,
            self.neighborhoods,
            distance
        )
    }
}

impl Default for AtlasAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::GeoJsonWriter;
    use geo::{polygon, MultiPolygon};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn row(code: &str, count: u64, rate: f64, distance: Option<f64>) -> NeighborhoodStats {
        NeighborhoodStats {
            code: code.to_string(),
            name: format!("{code} name"),
            borough: "Manhattan".to_string(),
            complaint_count: count,
            population: (count > 0).then_some(1000),
            rate,
            mean_park_distance: distance,
            geometry: MultiPolygon::new(vec![polygon![
                (x: -73.95, y: 40.80),
                (x: -73.90, y: 40.80),
                (x: -73.90, y: 40.85),
                (x: -73.95, y: 40.80),
            ]]),
        }
    }

    #[test]
    fn test_analyze() {
        let stats = AtlasAnalyzer::new().analyze(&[
            row("MN12", 10, 2.0, Some(100.0)),
            row("MN13", 3, 3.0, Some(300.0)),
            row("BK09", 0, 0.0, None),
        ]);

        assert_eq!(stats.neighborhoods, 3);
        assert_eq!(stats.total_complaints, 13);
        assert_eq!(stats.with_complaints, 2);
        assert_eq!(stats.rate_stats.max_rate, 3.0);
        assert_eq!(stats.rate_stats.min_rate, 0.0);
        assert_eq!(stats.distance_coverage.covered, 2);
        assert_eq!(stats.distance_coverage.mean_distance, Some(200.0));
        assert_eq!(stats.top_by_rate[0].0, "MN13");
        assert_eq!(stats.top_by_rate.len(), 2);
        assert!(stats.detailed_summary().contains("1. MN13"));
    }

    #[test]
    fn test_analyze_exported_geojson() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nta.geojson");
        GeoJsonWriter::new().write_neighborhoods(
            &[row("MN12", 10, 2.0, Some(50.0)), row("BK09", 0, 0.0, None)],
            &path,
        )?;

        let stats = AtlasAnalyzer::new().analyze_geojson(&path)?;

        assert_eq!(stats.neighborhoods, 2);
        assert_eq!(stats.total_complaints, 10);
        assert_eq!(stats.with_population, 1);
        assert!(stats.geographic_bounds.unwrap().diagonal_km() > 0.0);
        Ok(())
    }
}
