use crate::error::{AnalysisError, Result};
use crate::models::{Complaint, Layer, NeighborhoodStats, Park};
use crate::utils::constants::{CHART_SIZE, DEFAULT_HISTOGRAM_BINS, PLOT_SIZE};
use geo::{BoundingRect, LineString, MultiPolygon, Rect};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

type MapCoords = Cartesian2d<RangedCoordf64, RangedCoordf64>;

const LOW_COLOUR: RGBColor = RGBColor(255, 255, 204);
const HIGH_COLOUR: RGBColor = RGBColor(189, 0, 38);
const NO_DATA_COLOUR: RGBColor = RGBColor(200, 200, 200);
const PARK_COLOUR: RGBColor = RGBColor(116, 196, 118);
const PARK_OUTLINE: RGBColor = RGBColor(35, 139, 69);
const POINT_COLOUR: RGBColor = RGBColor(203, 24, 29);

fn plot_error<E: std::fmt::Display>(error: E) -> AnalysisError {
    AnalysisError::Plot(error.to_string())
}

/// Linear ramp from pale yellow to dark red; grey for values it cannot place
pub fn ramp_colour(value: f64, range: &Range<f64>) -> RGBColor {
    if !value.is_finite() || value < range.start || value > range.end {
        return NO_DATA_COLOUR;
    }

    let span = range.end - range.start;
    let t = if span > 0.0 {
        (value - range.start) / span
    } else {
        0.0
    };
    let mix = |low: u8, high: u8| (low as f64 + (high as f64 - low as f64) * t).round() as u8;

    RGBColor(
        mix(LOW_COLOUR.0, HIGH_COLOUR.0),
        mix(LOW_COLOUR.1, HIGH_COLOUR.1),
        mix(LOW_COLOUR.2, HIGH_COLOUR.2),
    )
}

/// Equal-width bins over the finite values: `(start, end, count)`
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let start = min + i as f64 * width;
            (start, start + width, count)
        })
        .collect()
}

/// Pad a data range so plotters never gets an empty axis
fn padded(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((max - min) * 0.05).max(1e-6);
    (min - pad)..(max + pad)
}

fn union_bounds(rects: impl Iterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    rects.reduce(|a, b| {
        Rect::new(
            (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
            (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
        )
    })
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

/// Fill every polygon, punch its holes in white and outline the rings
fn draw_multipolygon<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, MapCoords>,
    geometry: &MultiPolygon<f64>,
    fill: RGBColor,
    outline: &RGBColor,
) -> Result<()> {
    for polygon in geometry {
        chart
            .draw_series(std::iter::once(plotters::element::Polygon::new(
                ring_points(polygon.exterior()),
                fill.filled(),
            )))
            .map_err(plot_error)?;

        for hole in polygon.interiors() {
            chart
                .draw_series(std::iter::once(plotters::element::Polygon::new(
                    ring_points(hole),
                    WHITE.filled(),
                )))
                .map_err(plot_error)?;
        }

        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    ring_points(ring),
                    outline.stroke_width(1),
                )))
                .map_err(plot_error)?;
        }
    }
    Ok(())
}

/// SVG charts of the analysis results
pub struct ChartWriter {
    bins: usize,
}

impl ChartWriter {
    pub fn new() -> Self {
        Self {
            bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins.max(1);
        self
    }

    /// NTAs shaded by complaints per 1,000 residents
    pub fn choropleth(&self, stats: &[NeighborhoodStats], path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let bounds = union_bounds(stats.iter().filter_map(|s| s.geometry.bounding_rect()));
        let (x_range, y_range) = match bounds {
            Some(rect) => (
                padded(rect.min().x, rect.max().x),
                padded(rect.min().y, rect.max().y),
            ),
            None => (0.0..1.0, 0.0..1.0),
        };

        let max_rate = stats
            .iter()
            .map(|s| s.rate)
            .filter(|r| r.is_finite())
            .fold(0.0, f64::max);
        let rate_range = 0.0..max_rate;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Ice cream truck complaints per 1,000 residents (max {:.2})", max_rate),
                ("sans-serif", 24),
            )
            .margin(10)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_error)?;

        for row in stats {
            draw_multipolygon(&mut chart, &row.geometry, ramp_colour(row.rate, &rate_range), &BLACK)?;
        }

        root.present().map_err(plot_error)?;
        debug!(path = %path.display(), neighborhoods = stats.len(), "Rendered choropleth");
        Ok(())
    }

    /// Distribution of complaint-to-park distances in metres
    pub fn distance_histogram(&self, distances: &[Option<f64>], path: &Path) -> Result<()> {
        let values: Vec<f64> = distances.iter().flatten().copied().collect();
        let bins = histogram_bins(&values, self.bins);

        let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let x_range = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => first.0..last.1,
            _ => 0.0..1.0,
        };
        let y_max = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1) as f64 * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption("Distance from complaint to nearest park", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0.0..y_max)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("distance (m)")
            .y_desc("complaints")
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(bins.iter().map(|&(start, end, count)| {
                Rectangle::new([(start, 0.0), (end, count as f64)], BLUE.mix(0.7).filled())
            }))
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        debug!(path = %path.display(), bins = bins.len(), "Rendered distance histogram");
        Ok(())
    }

    /// Mean park distance against complaint count, one point per NTA
    pub fn distance_vs_complaints(&self, stats: &[NeighborhoodStats], path: &Path) -> Result<()> {
        let points: Vec<(f64, f64)> = stats
            .iter()
            .filter_map(|s| {
                let distance = s.mean_park_distance.filter(|d| d.is_finite())?;
                Some((distance, s.complaint_count as f64))
            })
            .collect();

        let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let x_max = points.iter().map(|p| p.0).fold(0.0, f64::max);
        let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(&root)
            .caption("Mean distance to park vs complaints per NTA", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(padded(0.0, x_max), padded(0.0, y_max))
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("mean distance to nearest park (m)")
            .y_desc("complaints")
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, POINT_COLOUR.mix(0.8).filled())),
            )
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        debug!(path = %path.display(), points = points.len(), "Rendered scatter");
        Ok(())
    }

    /// Park polygons with complaint points drawn on top
    pub fn parks_overlay(
        &self,
        parks: &Layer<Park>,
        complaints: &Layer<Complaint>,
        path: &Path,
    ) -> Result<()> {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let bounds = union_bounds(
            parks
                .iter()
                .filter_map(|p| p.geometry.bounding_rect())
                .chain(complaints.iter().map(|c| Rect::new(c.location.0, c.location.0))),
        );
        let (x_range, y_range) = match bounds {
            Some(rect) => (
                padded(rect.min().x, rect.max().x),
                padded(rect.min().y, rect.max().y),
            ),
            None => (0.0..1.0, 0.0..1.0),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption("Parks and ice cream truck complaints", ("sans-serif", 24))
            .margin(10)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_error)?;

        for park in parks.iter() {
            draw_multipolygon(&mut chart, &park.geometry, PARK_COLOUR, &PARK_OUTLINE)?;
        }

        chart
            .draw_series(complaints.iter().map(|c| {
                Circle::new((c.location.x(), c.location.y()), 2, POINT_COLOUR.filled())
            }))
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        debug!(path = %path.display(), parks = parks.len(), complaints = complaints.len(), "Rendered overlay");
        Ok(())
    }
}

impl Default for ChartWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_ramp_colour() {
        let range = 0.0..10.0;
        assert_eq!(ramp_colour(0.0, &range), LOW_COLOUR);
        assert_eq!(ramp_colour(10.0, &range), HIGH_COLOUR);
        assert_eq!(ramp_colour(f64::NAN, &range), NO_DATA_COLOUR);
        assert_eq!(ramp_colour(-1.0, &range), NO_DATA_COLOUR);
        // all-zero layers still get the low end
        assert_eq!(ramp_colour(0.0, &(0.0..0.0)), LOW_COLOUR);
    }

    #[test]
    fn test_histogram_bins() {
        let bins = histogram_bins(&[0.0, 1.0, 2.0, 10.0, f64::NAN], 5);

        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0], (0.0, 2.0, 2));
        assert_eq!(bins[1].2, 1);
        assert_eq!(bins[4].2, 1);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 4);
        assert!(histogram_bins(&[], 5).is_empty());
    }

    #[test]
    fn test_charts_render_with_empty_and_real_data() -> Result<()> {
        let dir = TempDir::new()?;
        let writer = ChartWriter::new().with_bins(10);

        let stats = vec![NeighborhoodStats {
            code: "MN12".to_string(),
            name: "Washington Heights South".to_string(),
            borough: "Manhattan".to_string(),
            complaint_count: 3,
            population: Some(1000),
            rate: 3.0,
            mean_park_distance: Some(120.0),
            geometry: MultiPolygon::new(vec![polygon![
                (x: -73.95, y: 40.84),
                (x: -73.93, y: 40.84),
                (x: -73.93, y: 40.86),
                (x: -73.95, y: 40.84),
            ]]),
        }];

        writer.choropleth(&stats, &dir.path().join("choropleth.svg"))?;
        writer.choropleth(&[], &dir.path().join("empty.svg"))?;
        writer.distance_histogram(&[Some(1.0), None, Some(40.0)], &dir.path().join("hist.svg"))?;
        writer.distance_histogram(&[], &dir.path().join("hist_empty.svg"))?;
        writer.distance_vs_complaints(&stats, &dir.path().join("scatter.svg"))?;

        let svg = std::fs::read_to_string(dir.path().join("choropleth.svg"))?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polygon"));
        Ok(())
    }
}
