use crate::error::Result;
use crate::processors::DistanceStrategy;
use crate::utils::constants::*;
use crate::utils::LocalProjection;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Everything a pipeline run needs to know
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    /// 311 complaint export (path or URL)
    pub complaints: String,
    /// NTA boundary GeoJSON (path or URL)
    pub neighborhoods: String,
    /// NTA population CSV (path or URL)
    pub population: String,
    /// Parks/greenspace GeoJSON (path or URL)
    pub parks: String,
    pub output_dir: PathBuf,

    #[validate(length(min = 1))]
    pub descriptor: String,
    pub population_year: i32,

    #[validate(length(min = 1))]
    pub park_categories: Vec<String>,

    #[validate(length(min = 1))]
    pub nta_code_property: String,
    #[validate(length(min = 1))]
    pub park_category_property: String,

    #[validate(range(min = -180.0, max = 180.0))]
    pub projection_origin_lon: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub projection_origin_lat: f64,

    pub strategy: DistanceStrategy,
    pub render_charts: bool,

    #[validate(range(min = 1, max = 500))]
    pub histogram_bins: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            complaints: COMPLAINTS_FILE.to_string(),
            neighborhoods: NTA_BOUNDARIES_URL.to_string(),
            population: NTA_POPULATION_URL.to_string(),
            parks: PARKS_FILE.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            descriptor: ICE_CREAM_TRUCK_DESCRIPTOR.to_string(),
            population_year: DEFAULT_POPULATION_YEAR,
            park_categories: DEFAULT_PARK_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            nta_code_property: NTA_CODE_PROPERTY.to_string(),
            park_category_property: PARK_CATEGORY_PROPERTY.to_string(),
            projection_origin_lon: PROJECTION_ORIGIN_LON,
            projection_origin_lat: PROJECTION_ORIGIN_LAT,
            strategy: DistanceStrategy::default(),
            render_charts: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Command line values that take precedence over files and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub complaints: Option<String>,
    pub neighborhoods: Option<String>,
    pub population: Option<String>,
    pub parks: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub descriptor: Option<String>,
    pub population_year: Option<i32>,
    pub strategy: Option<DistanceStrategy>,
    pub no_charts: bool,
}

impl PipelineConfig {
    /// Layer defaults, the TOML file and `NOISE_ATLAS_*` variables.
    ///
    /// An explicit `path` must exist; the default `noise-atlas.toml` is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::from(PathBuf::from(CONFIG_FILE)).required(false),
        };

        let config: PipelineConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("park_categories"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(complaints) = overrides.complaints {
            self.complaints = complaints;
        }
        if let Some(neighborhoods) = overrides.neighborhoods {
            self.neighborhoods = neighborhoods;
        }
        if let Some(population) = overrides.population {
            self.population = population;
        }
        if let Some(parks) = overrides.parks {
            self.parks = parks;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(descriptor) = overrides.descriptor {
            self.descriptor = descriptor;
        }
        if let Some(year) = overrides.population_year {
            self.population_year = year;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if overrides.no_charts {
            self.render_charts = false;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn projection(&self) -> LocalProjection {
        LocalProjection::new(self.projection_origin_lon, self.projection_origin_lat)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
