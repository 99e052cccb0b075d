use crate::models::{Layer, Park};
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon, Validation};
use tracing::{debug, info, warn};

/// A park whose geometry failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidGeometry {
    /// Position in the park layer
    pub index: usize,
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub total: usize,
    pub invalid: Vec<InvalidGeometry>,
    pub repaired: usize,
    /// Invalid parks whose rebuild came out empty; the original shape is kept
    pub kept_original: usize,
}

impl RepairReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Park Geometry Report:\n\
            - Parks checked: {}\n\
            - Invalid geometries: {}\n\
            - Repaired: {}\n\
            - Kept as-is: {}",
            self.total,
            self.invalid.len(),
            self.repaired,
            self.kept_original
        );

        for invalid in self.invalid.iter().take(10) {
            summary.push_str(&format!(
                "\n  #{} {}: {}",
                invalid.index, invalid.label, invalid.reason
            ));
        }
        if self.invalid.len() > 10 {
            summary.push_str(&format!("\n  ... and {} more", self.invalid.len() - 10));
        }

        summary
    }
}

/// Keep only parks whose category is in `categories`
pub fn filter_categories(parks: Layer<Park>, categories: &[String]) -> Layer<Park> {
    let before = parks.len();
    let crs = parks.crs;
    let kept: Vec<Park> = parks
        .features
        .into_iter()
        .filter(|park| categories.iter().any(|c| c == &park.category))
        .collect();

    debug!(before, after = kept.len(), "Filtered parks by category");
    Layer::new(crs, kept)
}

/// Validates park polygons and rebuilds the invalid ones
pub struct ParkRepairer;

impl ParkRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Validate without modifying
    pub fn check(&self, parks: &Layer<Park>) -> Vec<InvalidGeometry> {
        parks
            .iter()
            .enumerate()
            .filter_map(|(index, park)| {
                park.geometry
                    .check_validation()
                    .err()
                    .map(|reason| InvalidGeometry {
                        index,
                        label: park.label().to_string(),
                        reason: reason.to_string(),
                    })
            })
            .collect()
    }

    /// Repair every invalid park in place. No park is ever dropped.
    pub fn repair(&self, parks: Layer<Park>) -> (Layer<Park>, RepairReport) {
        let invalid = self.check(&parks);
        let mut report = RepairReport {
            total: parks.len(),
            ..Default::default()
        };

        let crs = parks.crs;
        let mut features = parks.features;

        for problem in &invalid {
            let park = &mut features[problem.index];
            let rebuilt = rebuild(&park.geometry);

            if rebuilt.0.is_empty() {
                warn!(park = %problem.label, reason = %problem.reason, "Geometry could not be rebuilt, keeping original");
                report.kept_original += 1;
            } else {
                debug!(park = %problem.label, "Rebuilt invalid geometry");
                park.geometry = rebuilt;
                park.repaired = true;
                report.repaired += 1;
            }
        }

        report.invalid = invalid;
        info!(
            total = report.total,
            invalid = report.invalid.len(),
            repaired = report.repaired,
            "Validated park geometries"
        );

        (Layer::new(crs, features), report)
    }
}

impl Default for ParkRepairer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clean the rings, then let the overlay engine resolve self-intersections
fn rebuild(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let cleaned: Vec<Polygon<f64>> = geometry.iter().filter_map(clean_polygon).collect();
    if cleaned.is_empty() {
        return MultiPolygon::new(vec![]);
    }

    MultiPolygon::new(cleaned).union(&MultiPolygon::<f64>::new(vec![]))
}

fn clean_polygon(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let exterior = clean_ring(polygon.exterior())?;
    let interiors = polygon.interiors().iter().filter_map(clean_ring).collect();
    Some(Polygon::new(exterior, interiors))
}

/// Drop non-finite and repeated vertices and close the ring; `None` if
/// fewer than four coordinates remain
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for coord in ring.coords().filter(|c| c.x.is_finite() && c.y.is_finite()) {
        if coords.last() != Some(coord) {
            coords.push(*coord);
        }
    }

    let mut cleaned = LineString::new(coords);
    cleaned.close();

    (cleaned.0.len() >= 4).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};
    use pretty_assertions::assert_eq;

    fn park(category: &str, name: &str, polygon: Polygon<f64>) -> Park {
        Park::new(
            category.to_string(),
            name.to_string(),
            MultiPolygon::new(vec![polygon]),
        )
    }

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ]
    }

    fn bowtie() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 4.0, y: 0.0),
            (x: 0.0, y: 4.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_filter_categories() {
        let parks = Layer::wgs84(vec![
            park("Playground", "A", square()),
            park("Cemetery", "B", square()),
            park("Neighborhood Park", "C", square()),
        ]);
        let categories = vec!["Playground".to_string(), "Neighborhood Park".to_string()];

        let kept = filter_categories(parks, &categories);
        let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_valid_geometry_untouched() {
        let parks = Layer::wgs84(vec![park("Playground", "Square", square())]);
        let (repaired, report) = ParkRepairer::new().repair(parks.clone());

        assert!(report.invalid.is_empty());
        assert_eq!(repaired.features, parks.features);
    }

    #[test]
    fn test_bowtie_is_repaired_and_kept() {
        let parks = Layer::wgs84(vec![
            park("Playground", "Square", square()),
            park("Neighborhood Park", "Bowtie", bowtie()),
        ]);

        let repairer = ParkRepairer::new();
        assert_eq!(repairer.check(&parks).len(), 1);

        let (repaired, report) = repairer.repair(parks);

        assert_eq!(repaired.len(), 2);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].label, "Bowtie");
        assert_eq!(report.repaired, 1);

        let fixed = &repaired.features[1];
        assert!(fixed.repaired);
        assert!(fixed.geometry.is_valid());
        // two triangles of area 4 each
        assert!((fixed.geometry.unsigned_area() - 8.0).abs() < 1e-9);
        assert!(report.summary().contains("Invalid geometries: 1"));
    }

    #[test]
    fn test_clean_ring_drops_repeats_and_closes() {
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (0.0, 0.0),
            (1.0, 0.0),
            (f64::NAN, 3.0),
            (1.0, 1.0),
        ]);
        let cleaned = clean_ring(&ring).unwrap();

        assert_eq!(
            cleaned,
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])
        );
        assert!(clean_ring(&LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])).is_none());
    }
}
