use crate::error::Result;
use crate::models::{Layer, Neighborhood};
use crate::readers::geojson_support::{feature_multipolygon, parse_feature_collection, string_property};
use crate::utils::constants::{NTA_BOROUGH_PROPERTY, NTA_CODE_PROPERTY, NTA_NAME_PROPERTY};
use tracing::{info, warn};

/// Reads NTA boundary polygons from GeoJSON
pub struct BoundaryReader {
    code_property: String,
}

impl BoundaryReader {
    pub fn new() -> Self {
        Self {
            code_property: NTA_CODE_PROPERTY.to_string(),
        }
    }

    pub fn with_code_property(code_property: &str) -> Self {
        Self {
            code_property: code_property.to_string(),
        }
    }

    pub fn read_str(&self, text: &str) -> Result<Layer<Neighborhood>> {
        let (crs, features) = parse_feature_collection(text)?;
        let mut neighborhoods = Vec::with_capacity(features.len());

        for (index, feature) in features.iter().enumerate() {
            let Some(code) = string_property(feature, &self.code_property).filter(|c| !c.is_empty())
            else {
                warn!(index, property = %self.code_property, "Boundary feature has no NTA code, skipping");
                continue;
            };

            let Some(geometry) = feature_multipolygon(feature) else {
                warn!(index, code = %code, "Boundary feature is not polygonal, skipping");
                continue;
            };

            neighborhoods.push(Neighborhood::new(
                code,
                string_property(feature, NTA_NAME_PROPERTY).unwrap_or_default(),
                string_property(feature, NTA_BOROUGH_PROPERTY).unwrap_or_default(),
                geometry,
            ));
        }

        info!(count = neighborhoods.len(), "Loaded NTA boundaries");
        Ok(Layer::new(crs, neighborhoods))
    }
}

impl Default for BoundaryReader {
    fn default() -> Self {
        Self::new()
    }
}
