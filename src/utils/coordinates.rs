use crate::error::{AnalysisError, Result};
use crate::utils::constants::{EARTH_RADIUS_M, PROJECTION_ORIGIN_LAT, PROJECTION_ORIGIN_LON};
use geo::Coord;

/// Parse a decimal-degree coordinate
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();
    let value = trimmed.parse::<f64>().map_err(|_| {
        AnalysisError::InvalidFormat(format!("Invalid coordinate value: '{}'", coord_str))
    })?;

    if !value.is_finite() {
        return Err(AnalysisError::InvalidFormat(format!(
            "Non-finite coordinate value: '{}'",
            coord_str
        )));
    }

    Ok(value)
}

/// Equirectangular projection around a fixed origin, output in metres.
///
/// Accurate to well under a percent across a city-sized extent, which is all
/// the proximity analysis needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    pub origin_lon: f64,
    pub origin_lat: f64,
    cos_origin_lat: f64,
}

impl LocalProjection {
    pub fn new(origin_lon: f64, origin_lat: f64) -> Self {
        Self {
            origin_lon,
            origin_lat,
            cos_origin_lat: origin_lat.to_radians().cos(),
        }
    }

    /// Project a lon/lat coordinate into metres east/north of the origin
    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: EARTH_RADIUS_M * (coord.x - self.origin_lon).to_radians() * self.cos_origin_lat,
            y: EARTH_RADIUS_M * (coord.y - self.origin_lat).to_radians(),
        }
    }

    /// Inverse of [`LocalProjection::forward`]
    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin_lon + (coord.x / (EARTH_RADIUS_M * self.cos_origin_lat)).to_degrees(),
            y: self.origin_lat + (coord.y / EARTH_RADIUS_M).to_degrees(),
        }
    }

    pub fn crs_name(&self) -> String {
        format!(
            "LOCAL:equirectangular({:.4},{:.4})",
            self.origin_lon, self.origin_lat
        )
    }
}

impl Default for LocalProjection {
    fn default() -> Self {
        Self::new(PROJECTION_ORIGIN_LON, PROJECTION_ORIGIN_LAT)
    }
}

/// Great-circle distance in metres between two lon/lat positions
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert!((parse_coordinate("40.7484").unwrap() - 40.7484).abs() < 0.000001);
        assert!((parse_coordinate(" -73.9857 ").unwrap() - -73.9857).abs() < 0.000001);
        assert!(parse_coordinate("north").is_err());
        assert!(parse_coordinate("NaN").is_err());
    }

    #[test]
    fn test_projection_origin_maps_to_zero() {
        let projection = LocalProjection::default();
        let projected = projection.forward(Coord {
            x: PROJECTION_ORIGIN_LON,
            y: PROJECTION_ORIGIN_LAT,
        });
        assert!(projected.x.abs() < 1e-9);
        assert!(projected.y.abs() < 1e-9);
    }

    #[test]
    fn test_projection_round_trip() {
        let projection = LocalProjection::default();
        let original = Coord {
            x: -73.9442,
            y: 40.6782,
        };
        let back = projection.inverse(projection.forward(original));
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_projection_matches_haversine_within_city() {
        // Empire State Building to Prospect Park
        let projection = LocalProjection::default();
        let a = projection.forward(Coord {
            x: -73.9857,
            y: 40.7484,
        });
        let b = projection.forward(Coord {
            x: -73.9690,
            y: 40.6602,
        });
        let planar = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        let great_circle = haversine_distance(40.7484, -73.9857, 40.6602, -73.9690);

        assert!((planar - great_circle).abs() / great_circle < 0.005);
    }
}
