use crate::error::{AnalysisError, Result};
use crate::models::PopulationRecord;
use crate::utils::columns::{normalize_headers, parse_optional};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, info};

/// Reads the NTA population table
pub struct PopulationReader;

impl PopulationReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_str(&self, text: &str) -> Result<Vec<PopulationRecord>> {
        self.read_population(text.as_bytes())
    }

    pub fn read_population<R: Read>(&self, source: R) -> Result<Vec<PopulationRecord>> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);
        let headers = normalize_headers(reader.headers()?);

        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AnalysisError::MissingData(format!("population column '{}'", name)))
        };
        let code_col = position("nta_code")?;
        let year_col = position("year")?;
        let population_col = position("population")?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let Some(code) = row.get(code_col).map(str::trim).filter(|c| !c.is_empty()) else {
                debug!("Population row without NTA code, skipping");
                continue;
            };

            // published counts sometimes carry thousands separators
            let population = row.get(population_col).map(|p| p.replace(',', ""));

            records.push(PopulationRecord::new(
                code.to_string(),
                parse_optional(row.get(year_col)),
                parse_optional(population.as_deref()),
            ));
        }

        info!(count = records.len(), "Loaded population records");
        Ok(records)
    }
}

impl Default for PopulationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Population per NTA code for one census year; first row wins on duplicates
pub fn population_for_year(records: &[PopulationRecord], year: i32) -> BTreeMap<String, Option<u64>> {
    let mut by_code = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_year(year)) {
        by_code
            .entry(record.nta_code.clone())
            .or_insert(record.population);
    }
    by_code
}
