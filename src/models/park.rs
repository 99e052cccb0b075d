use crate::models::layer::Reproject;
use crate::utils::LocalProjection;
use geo::{MapCoords, MultiPolygon};

/// Park or greenspace polygon
#[derive(Debug, Clone, PartialEq)]
pub struct Park {
    pub category: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    /// Set when the geometry failed validation and was rebuilt
    pub repaired: bool,
}

impl Park {
    pub fn new(category: String, name: String, geometry: MultiPolygon<f64>) -> Self {
        Self {
            category,
            name,
            geometry,
            repaired: false,
        }
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.category
        } else {
            &self.name
        }
    }
}

impl Reproject for Park {
    fn reproject(&self, projection: &LocalProjection) -> Self {
        Self {
            category: self.category.clone(),
            name: self.name.clone(),
            geometry: self.geometry.map_coords(|c| projection.forward(c)),
            repaired: self.repaired,
        }
    }
}
