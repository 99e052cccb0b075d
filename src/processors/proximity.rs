use crate::error::{AnalysisError, Result};
use crate::models::{Complaint, Crs, Layer, NeighborhoodStats, Park};
use geo::{BoundingRect, Distance, Euclidean, Intersects, Point, Polygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{PointDistance, RTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// How nearest-park distances are searched
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceStrategy {
    /// Every complaint against every park polygon
    AllPairs,
    /// R-tree over polygon envelopes, pruned by envelope distance
    #[default]
    Indexed,
}

type PolygonEntry = GeomWithData<Rectangle<[f64; 2]>, (usize, usize)>;

/// Distance in CRS units from a point to one park polygon; 0 inside or on the edge
pub fn polygon_distance(point: &Point<f64>, polygon: &Polygon<f64>) -> f64 {
    if polygon.intersects(point) {
        0.0
    } else {
        Euclidean.distance(point, polygon)
    }
}

/// Distance to the nearest polygon of a park
pub fn park_distance(point: &Point<f64>, park: &Park) -> f64 {
    park.geometry
        .iter()
        .map(|polygon| polygon_distance(point, polygon))
        .fold(f64::INFINITY, f64::min)
}

pub struct ProximityAnalyzer {
    strategy: DistanceStrategy,
}

impl ProximityAnalyzer {
    pub fn new(strategy: DistanceStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    /// Metres from each complaint to its nearest park, in complaint order.
    ///
    /// Both layers must already be in the same local projection. Every
    /// entry is `None` when there are no parks.
    pub fn nearest_park_distances(
        &self,
        complaints: &Layer<Complaint>,
        parks: &Layer<Park>,
    ) -> Result<Vec<Option<f64>>> {
        if !matches!(complaints.crs, Crs::Local(_)) {
            return Err(AnalysisError::CrsMismatch {
                left: complaints.crs.to_string(),
                right: "local metric projection".to_string(),
            });
        }
        complaints.ensure_same_crs(parks)?;

        if parks.is_empty() {
            debug!("No parks to measure against");
            return Ok(vec![None; complaints.len()]);
        }

        let distances = match self.strategy {
            DistanceStrategy::AllPairs => self.all_pairs(complaints, parks),
            DistanceStrategy::Indexed => self.indexed(complaints, parks),
        };

        info!(
            complaints = distances.len(),
            parks = parks.len(),
            strategy = ?self.strategy,
            "Computed nearest-park distances"
        );
        Ok(distances)
    }

    fn all_pairs(&self, complaints: &Layer<Complaint>, parks: &Layer<Park>) -> Vec<Option<f64>> {
        complaints
            .iter()
            .map(|complaint| {
                let nearest = parks
                    .iter()
                    .map(|park| park_distance(&complaint.location, park))
                    .fold(f64::INFINITY, f64::min);
                nearest.is_finite().then_some(nearest)
            })
            .collect()
    }

    fn indexed(&self, complaints: &Layer<Complaint>, parks: &Layer<Park>) -> Vec<Option<f64>> {
        let entries: Vec<PolygonEntry> = parks
            .iter()
            .enumerate()
            .flat_map(|(park_index, park)| {
                park.geometry
                    .iter()
                    .enumerate()
                    .filter_map(move |(polygon_index, polygon)| {
                        let rect = polygon.bounding_rect()?;
                        Some(GeomWithData::new(
                            Rectangle::from_corners(
                                [rect.min().x, rect.min().y],
                                [rect.max().x, rect.max().y],
                            ),
                            (park_index, polygon_index),
                        ))
                    })
            })
            .collect();
        let tree = RTree::bulk_load(entries);

        complaints
            .iter()
            .map(|complaint| {
                let query = [complaint.location.x(), complaint.location.y()];
                let mut best = f64::INFINITY;

                // envelopes come back nearest first; an envelope is never
                // farther than the polygon inside it
                for entry in tree.nearest_neighbor_iter(&query) {
                    if entry.geom().distance_2(&query).sqrt() > best {
                        break;
                    }
                    let (park_index, polygon_index) = entry.data;
                    let polygon = &parks.features[park_index].geometry.0[polygon_index];
                    best = best.min(polygon_distance(&complaint.location, polygon));
                }

                best.is_finite().then_some(best)
            })
            .collect()
    }
}

impl Default for ProximityAnalyzer {
    fn default() -> Self {
        Self::new(DistanceStrategy::default())
    }
}

/// Mean nearest-park distance per NTA code; complaints without an NTA or a
/// distance are left out
pub fn mean_distance_by_neighborhood(
    assignments: &[Option<String>],
    distances: &[Option<f64>],
) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for (code, distance) in assignments.iter().zip(distances) {
        if let (Some(code), Some(distance)) = (code, distance) {
            let entry = totals.entry(code.as_str()).or_insert((0.0, 0));
            entry.0 += distance;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(code, (sum, count))| (code.to_string(), sum / count as f64))
        .collect()
}

/// Copy the per-NTA means onto the re-joined rows
pub fn attach_mean_distances(stats: &mut [NeighborhoodStats], means: &BTreeMap<String, f64>) {
    for row in stats.iter_mut() {
        row.mean_park_distance = means.get(&row.code).copied();
    }
}
