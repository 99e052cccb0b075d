use crate::error::Result;
use crate::models::{Layer, Park};
use crate::readers::geojson_support::{feature_multipolygon, parse_feature_collection, string_property};
use crate::utils::constants::{PARK_CATEGORY_PROPERTY, PARK_NAME_PROPERTIES};
use tracing::{info, warn};

/// Reads the greenspace layer; category filtering happens later
pub struct ParkReader {
    category_property: String,
}

impl ParkReader {
    pub fn new() -> Self {
        Self {
            category_property: PARK_CATEGORY_PROPERTY.to_string(),
        }
    }

    pub fn with_category_property(category_property: &str) -> Self {
        Self {
            category_property: category_property.to_string(),
        }
    }

    pub fn read_str(&self, text: &str) -> Result<Layer<Park>> {
        let (crs, features) = parse_feature_collection(text)?;
        let mut parks = Vec::with_capacity(features.len());

        for (index, feature) in features.iter().enumerate() {
            let Some(geometry) = feature_multipolygon(feature) else {
                warn!(index, "Park feature is not polygonal, skipping");
                continue;
            };

            let category = string_property(feature, &self.category_property).unwrap_or_default();
            let name = PARK_NAME_PROPERTIES
                .iter()
                .find_map(|key| string_property(feature, key).filter(|n| !n.is_empty()))
                .unwrap_or_default();

            parks.push(Park::new(category, name, geometry));
        }

        info!(count = parks.len(), "Loaded park polygons");
        Ok(Layer::new(crs, parks))
    }
}

impl Default for ParkReader {
    fn default() -> Self {
        Self::new()
    }
}
