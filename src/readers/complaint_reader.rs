use crate::error::{AnalysisError, Result};
use crate::models::ComplaintRecord;
use crate::utils::columns::normalize_headers;
use crate::utils::constants::{CREATED_DATE_FORMAT, CREATED_DATE_ISO_FORMAT};
use crate::utils::parse_coordinate;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

/// Parse a `Created Date` cell; anything unparseable becomes `None`
pub fn parse_created_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(trimmed, CREATED_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, CREATED_DATE_ISO_FORMAT))
        .ok()
}

/// Records read from a complaint export plus what degraded along the way
#[derive(Debug, Clone, Default)]
pub struct ComplaintTable {
    pub records: Vec<ComplaintRecord>,
    /// Rows whose timestamp was present but unparseable
    pub unparsed_timestamps: usize,
    /// Rows the CSV layer could not decode at all
    pub skipped_rows: usize,
}

/// Column positions after header normalization
struct ComplaintColumns {
    unique_key: Option<usize>,
    created_date: Option<usize>,
    complaint_type: Option<usize>,
    descriptor: usize,
    city: Option<usize>,
    community_board: Option<usize>,
    borough: Option<usize>,
    latitude: usize,
    longitude: usize,
}

impl ComplaintColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();

        let required = |name: &str| {
            index.get(name).copied().ok_or_else(|| {
                AnalysisError::MissingData(format!("complaint column '{}'", name))
            })
        };

        Ok(Self {
            unique_key: index.get("unique_key").copied(),
            created_date: index.get("created_date").copied(),
            complaint_type: index.get("complaint_type").copied(),
            descriptor: required("descriptor")?,
            city: index.get("city").copied(),
            community_board: index.get("community_board").copied(),
            borough: index.get("borough").copied(),
            latitude: required("latitude")?,
            longitude: required("longitude")?,
        })
    }
}

pub struct ComplaintReader {
    delimiter: u8,
}

impl ComplaintReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read complaint records from CSV text
    pub fn read_str(&self, text: &str) -> Result<ComplaintTable> {
        self.read_complaints(text.as_bytes())
    }

    /// Read complaint records from any CSV source
    pub fn read_complaints<R: Read>(&self, source: R) -> Result<ComplaintTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(source);

        let headers = normalize_headers(reader.headers()?);
        let columns = ComplaintColumns::from_headers(&headers)?;
        reader.set_headers(headers);

        let mut table = ComplaintTable::default();

        for (row, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => {
                    debug!(row = row + 1, error = %e, "Skipping undecodable complaint row");
                    table.skipped_rows += 1;
                    continue;
                }
            };

            let (complaint, timestamp_failed) = self.parse_record(&record, &columns);
            if timestamp_failed {
                debug!(row = row + 1, "Unparseable created date");
                table.unparsed_timestamps += 1;
            }
            table.records.push(complaint);
        }

        if table.skipped_rows > 0 {
            warn!(skipped = table.skipped_rows, "Skipped undecodable complaint rows");
        }

        Ok(table)
    }

    /// Build a record from one CSV row; the flag reports a bad timestamp
    fn parse_record(
        &self,
        record: &StringRecord,
        columns: &ComplaintColumns,
    ) -> (ComplaintRecord, bool) {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let raw_date = cell(columns.created_date);
        let created_date = parse_created_date(&raw_date);
        let timestamp_failed = created_date.is_none() && !raw_date.is_empty();

        let coordinate = |index: usize| {
            record
                .get(index)
                .filter(|v| !v.trim().is_empty())
                .and_then(|v| parse_coordinate(v).ok())
        };

        let complaint = ComplaintRecord {
            unique_key: cell(columns.unique_key),
            created_date,
            complaint_type: cell(columns.complaint_type),
            descriptor: cell(Some(columns.descriptor)),
            city: cell(columns.city),
            community_board: cell(columns.community_board),
            borough: cell(columns.borough),
            latitude: coordinate(columns.latitude),
            longitude: coordinate(columns.longitude),
        };

        (complaint, timestamp_failed)
    }
}

impl Default for ComplaintReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use pretty_assertions::assert_eq;

    const HEADER: &str = "Unique Key,Created Date,Closed Date,Agency,Complaint Type,Descriptor,City,Community Board,Borough,Latitude,Longitude";

    #[test]
    fn test_parse_created_date() {
        let parsed = parse_created_date("  07/04/2019 03:15:22 PM ").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2019, 7, 4).unwrap());
        assert_eq!(parsed.hour(), 15);

        assert!(parse_created_date("2019-07-04T15:15:22.000").is_some());
        assert!(parse_created_date("not a date").is_none());
        assert!(parse_created_date("").is_none());
    }

    #[test]
    fn test_read_complaints() -> Result<()> {
        let csv = format!(
            "{HEADER}\n\
             41000001,07/04/2019 03:15:22 PM,,NYPD,Noise - Vehicle,\"Noise, Ice Cream Truck (NR4)\",NEW YORK,12 MANHATTAN,MANHATTAN,40.85,-73.94\n\
             41000002,garbage,,NYPD,Noise - Vehicle,\"Noise, Ice Cream Truck (NR4)\",NEW YORK,12 MANHATTAN,MANHATTAN,40.85,\n\
             41000003,07/05/2019 01:00:00 AM,,NYPD,Noise - Street/Sidewalk,Loud Music/Party,BROOKLYN,09 BROOKLYN,BROOKLYN,40.69,-73.98\n"
        );

        let table = ComplaintReader::new().read_str(&csv)?;

        assert_eq!(table.records.len(), 3);
        assert_eq!(table.unparsed_timestamps, 1);
        assert_eq!(table.records[0].unique_key, "41000001");
        assert_eq!(table.records[0].descriptor, "Noise, Ice Cream Truck (NR4)");
        assert_eq!(table.records[0].community_board, "12 MANHATTAN");
        assert_eq!(table.records[0].longitude, Some(-73.94));
        assert!(table.records[1].created_date.is_none());
        assert_eq!(table.records[1].longitude, None);
        assert_eq!(table.records[2].borough, "BROOKLYN");
        Ok(())
    }

    #[test]
    fn test_short_rows_do_not_abort() -> Result<()> {
        let csv = format!("{HEADER}\n41000004,07/04/2019 03:15:22 PM,,NYPD\n");
        let table = ComplaintReader::new().read_str(&csv)?;

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].descriptor, "");
        assert_eq!(table.records[0].latitude, None);
        Ok(())
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Unique Key,Descriptor,Latitude\n1,x,40.0\n";
        assert!(matches!(
            ComplaintReader::new().read_str(csv),
            Err(AnalysisError::MissingData(_))
        ));
    }
}
