use crate::error::{AnalysisError, Result};
use crate::utils::LocalProjection;
use std::fmt;

/// Coordinate reference system tag carried by every layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Geographic lon/lat on WGS84 (EPSG:4326)
    Wgs84,
    /// Metres in a local equirectangular projection
    Local(LocalProjection),
}

impl Crs {
    /// Recognise the CRS names GeoJSON files put in their legacy `crs` member
    pub fn from_name(name: &str) -> Result<Self> {
        let upper = name.trim().to_uppercase();
        let is_wgs84 = upper == "EPSG:4326"
            || upper.ends_with("EPSG::4326")
            || upper.ends_with("OGC:1.3:CRS84")
            || upper.ends_with("OGC::CRS84")
            || upper == "CRS84"
            || upper == "WGS84";

        if is_wgs84 {
            Ok(Crs::Wgs84)
        } else {
            Err(AnalysisError::UnsupportedCrs(name.to_string()))
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Wgs84 => write!(f, "EPSG:4326"),
            Crs::Local(projection) => write!(f, "{}", projection.crs_name()),
        }
    }
}

/// Features that can be moved into the local metric projection
pub trait Reproject {
    fn reproject(&self, projection: &LocalProjection) -> Self;
}

/// A set of features sharing one CRS
#[derive(Debug, Clone)]
pub struct Layer<T> {
    pub crs: Crs,
    pub features: Vec<T>,
}

impl<T> Layer<T> {
    pub fn new(crs: Crs, features: Vec<T>) -> Self {
        Self { crs, features }
    }

    pub fn wgs84(features: Vec<T>) -> Self {
        Self::new(Crs::Wgs84, features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.features.iter()
    }

    /// Fail unless both layers use the same CRS
    pub fn ensure_same_crs<U>(&self, other: &Layer<U>) -> Result<()> {
        if self.crs == other.crs {
            Ok(())
        } else {
            Err(AnalysisError::CrsMismatch {
                left: self.crs.to_string(),
                right: other.crs.to_string(),
            })
        }
    }
}

impl<T: Reproject> Layer<T> {
    /// Project a WGS84 layer into the local metric CRS
    pub fn to_local(&self, projection: &LocalProjection) -> Result<Layer<T>> {
        if self.crs != Crs::Wgs84 {
            return Err(AnalysisError::CrsMismatch {
                left: self.crs.to_string(),
                right: Crs::Wgs84.to_string(),
            });
        }

        Ok(Layer::new(
            Crs::Local(*projection),
            self.features
                .iter()
                .map(|feature| feature.reproject(projection))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_from_name() {
        assert_eq!(
            Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            Crs::Wgs84
        );
        assert_eq!(Crs::from_name("urn:ogc:def:crs:EPSG::4326").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::from_name("EPSG:4326").unwrap(), Crs::Wgs84);
        assert!(matches!(
            Crs::from_name("urn:ogc:def:crs:EPSG::2263"),
            Err(AnalysisError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_layers_with_different_crs_refuse_to_join() {
        let geographic: Layer<u32> = Layer::wgs84(vec![1, 2]);
        let projected: Layer<u32> = Layer::new(Crs::Local(LocalProjection::default()), vec![3]);

        assert!(geographic.ensure_same_crs(&geographic).is_ok());
        assert!(matches!(
            geographic.ensure_same_crs(&projected),
            Err(AnalysisError::CrsMismatch { .. })
        ));
    }
}
