use crate::models::layer::Reproject;
use crate::utils::LocalProjection;
use chrono::NaiveDateTime;
use geo::{MapCoords, Point};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One row of the 311 service request export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ComplaintRecord {
    pub unique_key: String,
    pub created_date: Option<NaiveDateTime>,
    pub complaint_type: String,
    pub descriptor: String,
    pub city: String,
    pub community_board: String,
    pub borough: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl ComplaintRecord {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A complaint with its point geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub record: ComplaintRecord,
    pub location: Point<f64>,
}

impl Complaint {
    /// Build a geocoded complaint; `None` when either coordinate is missing
    pub fn from_record(record: ComplaintRecord) -> Option<Self> {
        let (longitude, latitude) = (record.longitude?, record.latitude?);
        Some(Self {
            location: Point::new(longitude, latitude),
            record,
        })
    }

    pub fn unique_key(&self) -> &str {
        &self.record.unique_key
    }
}

impl Reproject for Complaint {
    fn reproject(&self, projection: &LocalProjection) -> Self {
        Self {
            record: self.record.clone(),
            location: self.location.map_coords(|c| projection.forward(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(descriptor: &str, longitude: Option<f64>, latitude: Option<f64>) -> ComplaintRecord {
        ComplaintRecord {
            unique_key: "41234567".to_string(),
            created_date: None,
            complaint_type: "Noise - Vehicle".to_string(),
            descriptor: descriptor.to_string(),
            city: "NEW YORK".to_string(),
            community_board: "12 MANHATTAN".to_string(),
            borough: "MANHATTAN".to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_complaint_from_record() {
        let complaint = Complaint::from_record(record(
            "Noise, Ice Cream Truck (NR4)",
            Some(-73.93),
            Some(40.85),
        ))
        .unwrap();

        assert_eq!(complaint.location.x(), -73.93);
        assert_eq!(complaint.location.y(), 40.85);
    }

    #[test]
    fn test_missing_longitude_has_no_point() {
        let rec = record("Noise, Ice Cream Truck (NR4)", None, Some(40.85));
        assert!(!rec.has_coordinates());
        assert!(Complaint::from_record(rec).is_none());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(record("x", Some(-73.93), Some(40.85)).validate().is_ok());
        assert!(record("x", Some(-273.93), Some(40.85)).validate().is_err());
        assert!(record("x", Some(-73.93), Some(95.0)).validate().is_err());
    }
}
