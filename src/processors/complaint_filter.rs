use crate::models::{Complaint, ComplaintRecord, Layer};
use crate::readers::ComplaintTable;
use crate::utils::constants::ICE_CREAM_TRUCK_DESCRIPTOR;
use tracing::{debug, info};
use validator::Validate;

/// What happened to each row on the way from CSV to point layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub total_rows: usize,
    pub descriptor_mismatches: usize,
    pub missing_coordinates: usize,
    pub out_of_range_coordinates: usize,
    pub unparsed_timestamps: usize,
    pub skipped_rows: usize,
    pub retained: usize,
}

impl FilterReport {
    pub fn summary(&self) -> String {
        format!(
            "=== Complaint Filter Report ===\n\
            Rows read: {}\n\
            Undecodable rows: {}\n\
            Other descriptors: {}\n\
            Missing coordinates: {}\n\
            Out-of-range coordinates: {}\n\
            Unparsed timestamps: {}\n\
            Complaints retained: {}",
            self.total_rows,
            self.skipped_rows,
            self.descriptor_mismatches,
            self.missing_coordinates,
            self.out_of_range_coordinates,
            self.unparsed_timestamps,
            self.retained
        )
    }
}

/// Keeps one complaint descriptor and geocodes the survivors
pub struct ComplaintFilter {
    descriptor: String,
}

impl ComplaintFilter {
    pub fn new() -> Self {
        Self {
            descriptor: ICE_CREAM_TRUCK_DESCRIPTOR.to_string(),
        }
    }

    pub fn with_descriptor(descriptor: &str) -> Self {
        Self {
            descriptor: descriptor.to_string(),
        }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Exact descriptor match only
    pub fn matches(&self, record: &ComplaintRecord) -> bool {
        record.descriptor == self.descriptor
    }

    /// Filter a complaint table into a WGS84 point layer
    pub fn filter(&self, table: ComplaintTable) -> (Layer<Complaint>, FilterReport) {
        let mut report = FilterReport {
            total_rows: table.records.len(),
            unparsed_timestamps: table.unparsed_timestamps,
            skipped_rows: table.skipped_rows,
            ..Default::default()
        };

        let mut complaints = Vec::new();

        for record in table.records {
            if !self.matches(&record) {
                report.descriptor_mismatches += 1;
                continue;
            }

            if !record.has_coordinates() {
                report.missing_coordinates += 1;
                continue;
            }

            if let Err(e) = record.validate() {
                debug!(key = %record.unique_key, error = %e, "Dropping complaint with out-of-range coordinates");
                report.out_of_range_coordinates += 1;
                continue;
            }

            if let Some(complaint) = Complaint::from_record(record) {
                complaints.push(complaint);
            }
        }

        report.retained = complaints.len();
        info!(
            descriptor = %self.descriptor,
            retained = report.retained,
            total = report.total_rows,
            "Filtered complaints"
        );

        (Layer::wgs84(complaints), report)
    }
}

impl Default for ComplaintFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Crs;
    use pretty_assertions::assert_eq;

    fn record(key: &str, descriptor: &str, lon: Option<f64>, lat: Option<f64>) -> ComplaintRecord {
        ComplaintRecord {
            unique_key: key.to_string(),
            created_date: None,
            complaint_type: "Noise - Vehicle".to_string(),
            descriptor: descriptor.to_string(),
            city: "NEW YORK".to_string(),
            community_board: "12 MANHATTAN".to_string(),
            borough: "MANHATTAN".to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_filter_keeps_exact_descriptor_with_coordinates() {
        let table = ComplaintTable {
            records: vec![
                record("1", ICE_CREAM_TRUCK_DESCRIPTOR, Some(-73.94), Some(40.85)),
                record("2", "Noise, Ice Cream Truck", Some(-73.94), Some(40.85)),
                record("3", ICE_CREAM_TRUCK_DESCRIPTOR, None, Some(40.85)),
                record("4", ICE_CREAM_TRUCK_DESCRIPTOR, Some(-73.94), None),
                record("5", ICE_CREAM_TRUCK_DESCRIPTOR, Some(-373.94), Some(40.85)),
                record("6", "noise, ice cream truck (nr4)", Some(-73.94), Some(40.85)),
            ],
            unparsed_timestamps: 2,
            skipped_rows: 0,
        };

        let (layer, report) = ComplaintFilter::new().filter(table);

        assert_eq!(layer.crs, Crs::Wgs84);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.features[0].unique_key(), "1");
        assert_eq!(
            report,
            FilterReport {
                total_rows: 6,
                descriptor_mismatches: 2,
                missing_coordinates: 2,
                out_of_range_coordinates: 1,
                unparsed_timestamps: 2,
                skipped_rows: 0,
                retained: 1,
            }
        );
    }

    #[test]
    fn test_retained_complaints_have_coordinates() {
        let table = ComplaintTable {
            records: (0..20)
                .map(|i| {
                    let lon = if i % 3 == 0 { None } else { Some(-73.9 - i as f64 * 0.001) };
                    record(&i.to_string(), ICE_CREAM_TRUCK_DESCRIPTOR, lon, Some(40.7))
                })
                .collect(),
            ..Default::default()
        };

        let (layer, _) = ComplaintFilter::new().filter(table);

        assert!(layer.iter().all(|c| c.record.longitude.is_some() && c.record.latitude.is_some()));
        assert!(layer.iter().all(|c| c.location.x().is_finite() && c.location.y().is_finite()));
        assert_eq!(layer.len(), 13);
    }

    #[test]
    fn test_custom_descriptor() {
        let table = ComplaintTable {
            records: vec![record("1", "Loud Music/Party", Some(-73.94), Some(40.85))],
            ..Default::default()
        };
        let (layer, _) = ComplaintFilter::with_descriptor("Loud Music/Party").filter(table);
        assert_eq!(layer.len(), 1);
    }
}
