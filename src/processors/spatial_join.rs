use crate::error::Result;
use crate::models::{Complaint, Layer, Neighborhood, NeighborhoodStats, NeighborhoodSummary};
use geo::{BoundingRect, Contains, Intersects, MultiPoint, Point};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use std::collections::BTreeMap;
use tracing::{debug, info};

type EnvelopeEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Point-in-polygon assignment of complaints to NTAs
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult {
    /// NTA code per complaint, in complaint order
    pub assignments: Vec<Option<String>>,
    pub matched: usize,
    /// On a boundary or outside every polygon
    pub unmatched: usize,
}

/// Envelope index over NTA polygons
pub struct NeighborhoodIndex<'a> {
    layer: &'a Layer<Neighborhood>,
    tree: RTree<EnvelopeEntry>,
}

impl<'a> NeighborhoodIndex<'a> {
    pub fn new(layer: &'a Layer<Neighborhood>) -> Self {
        let entries = layer
            .iter()
            .enumerate()
            .filter_map(|(index, neighborhood)| {
                let rect = neighborhood.geometry.bounding_rect()?;
                Some(GeomWithData::new(
                    Rectangle::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    index,
                ))
            })
            .collect();

        Self {
            layer,
            tree: RTree::bulk_load(entries),
        }
    }

    /// First NTA in layer order whose interior contains the point.
    ///
    /// Points on a shared boundary are in no interior and match nothing.
    pub fn locate(&self, point: &Point<f64>) -> Option<&'a Neighborhood> {
        let query = AABB::from_point([point.x(), point.y()]);

        self.tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.data)
            .filter(|&index| self.layer.features[index].geometry.contains(point))
            .min()
            .map(|index| &self.layer.features[index])
    }
}

pub struct SpatialJoiner;

impl SpatialJoiner {
    pub fn new() -> Self {
        Self
    }

    /// Assign each complaint the NTA that strictly contains it
    pub fn assign(
        &self,
        complaints: &Layer<Complaint>,
        neighborhoods: &Layer<Neighborhood>,
    ) -> Result<JoinResult> {
        complaints.ensure_same_crs(neighborhoods)?;

        let index = NeighborhoodIndex::new(neighborhoods);
        let assignments: Vec<Option<String>> = complaints
            .iter()
            .map(|complaint| {
                let found = index.locate(&complaint.location).map(|n| n.code.clone());
                if found.is_none() {
                    debug!(key = %complaint.unique_key(), "Complaint falls in no NTA");
                }
                found
            })
            .collect();

        let matched = assignments.iter().filter(|a| a.is_some()).count();
        let result = JoinResult {
            unmatched: assignments.len() - matched,
            matched,
            assignments,
        };

        info!(
            matched = result.matched,
            unmatched = result.unmatched,
            "Joined complaints to NTAs"
        );
        Ok(result)
    }

    /// Count and union the matched points per NTA, then attach population
    pub fn summarize(
        &self,
        complaints: &Layer<Complaint>,
        join: &JoinResult,
        population: &BTreeMap<String, Option<u64>>,
    ) -> Layer<NeighborhoodSummary> {
        let mut points_by_code: BTreeMap<&str, Vec<Point<f64>>> = BTreeMap::new();

        for (complaint, code) in complaints.iter().zip(&join.assignments) {
            if let Some(code) = code {
                points_by_code
                    .entry(code.as_str())
                    .or_default()
                    .push(complaint.location);
            }
        }

        let summaries = points_by_code
            .into_iter()
            .map(|(code, points)| {
                // left join: an NTA missing from the population table keeps None
                let population = population.get(code).copied().flatten();
                NeighborhoodSummary::new(code.to_string(), MultiPoint::new(points), population)
            })
            .collect();

        Layer::new(complaints.crs, summaries)
    }

    /// Attach summaries back onto every NTA polygon by intersection.
    ///
    /// A polygon prefers the intersecting summary with its own code, then
    /// the first in code order. Polygons with no intersecting summary are
    /// zero-filled.
    pub fn rejoin(
        &self,
        neighborhoods: &Layer<Neighborhood>,
        summaries: &Layer<NeighborhoodSummary>,
    ) -> Result<Vec<NeighborhoodStats>> {
        neighborhoods.ensure_same_crs(summaries)?;

        let stats = neighborhoods
            .iter()
            .map(|neighborhood| {
                let intersecting: Vec<&NeighborhoodSummary> = summaries
                    .iter()
                    .filter(|summary| neighborhood.geometry.intersects(&summary.points))
                    .collect();

                let chosen = intersecting
                    .iter()
                    .find(|s| s.code == neighborhood.code)
                    .or_else(|| intersecting.first())
                    .copied();

                match chosen {
                    Some(summary) => NeighborhoodStats::from_summary(neighborhood, summary),
                    None => NeighborhoodStats::zero(neighborhood),
                }
            })
            .collect::<Vec<_>>();

        let with_complaints = stats.iter().filter(|s| s.complaint_count > 0).count();
        info!(
            neighborhoods = stats.len(),
            with_complaints,
            "Re-joined complaint summaries onto NTA polygons"
        );
        Ok(stats)
    }
}

impl Default for SpatialJoiner {
    fn default() -> Self {
        Self::new()
    }
}
