use crate::utils::constants::RATE_SCALE;
use geo::{MultiPoint, MultiPolygon};

/// Neighborhood Tabulation Area polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    pub code: String,
    pub name: String,
    pub borough: String,
    pub geometry: MultiPolygon<f64>,
}

impl Neighborhood {
    pub fn new(code: String, name: String, borough: String, geometry: MultiPolygon<f64>) -> Self {
        Self {
            code,
            name,
            borough,
            geometry,
        }
    }
}

/// Complaints aggregated per NTA before the polygon re-join
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodSummary {
    pub code: String,
    pub complaint_count: u64,
    pub points: MultiPoint<f64>,
    pub population: Option<u64>,
    pub rate: f64,
}

impl NeighborhoodSummary {
    pub fn new(code: String, points: MultiPoint<f64>, population: Option<u64>) -> Self {
        let complaint_count = points.0.len() as u64;
        Self {
            rate: per_capita_rate(complaint_count, population),
            code,
            complaint_count,
            points,
            population,
        }
    }
}

/// Complaints per 1,000 residents; 0 when the population is unknown or zero
pub fn per_capita_rate(complaint_count: u64, population: Option<u64>) -> f64 {
    match population {
        Some(population) if population > 0 => {
            complaint_count as f64 * RATE_SCALE / population as f64
        }
        _ => 0.0,
    }
}

/// Final per-polygon row exported and charted
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodStats {
    pub code: String,
    pub name: String,
    pub borough: String,
    pub complaint_count: u64,
    pub population: Option<u64>,
    pub rate: f64,
    pub mean_park_distance: Option<f64>,
    pub geometry: MultiPolygon<f64>,
}

impl NeighborhoodStats {
    /// A polygon with no matching summary: a true zero, not an unknown
    pub fn zero(neighborhood: &Neighborhood) -> Self {
        Self {
            code: neighborhood.code.clone(),
            name: neighborhood.name.clone(),
            borough: neighborhood.borough.clone(),
            complaint_count: 0,
            population: None,
            rate: 0.0,
            mean_park_distance: None,
            geometry: neighborhood.geometry.clone(),
        }
    }

    pub fn from_summary(neighborhood: &Neighborhood, summary: &NeighborhoodSummary) -> Self {
        Self {
            complaint_count: summary.complaint_count,
            population: summary.population,
            rate: summary.rate,
            ..Self::zero(neighborhood)
        }
    }
}
