use serde::{Deserialize, Serialize};

/// Population of one NTA in one census year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub nta_code: String,
    pub year: Option<i32>,
    pub population: Option<u64>,
}

impl PopulationRecord {
    pub fn new(nta_code: String, year: Option<i32>, population: Option<u64>) -> Self {
        Self {
            nta_code,
            year,
            population,
        }
    }

    pub fn is_year(&self, year: i32) -> bool {
        self.year == Some(year)
    }
}
