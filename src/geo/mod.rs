//! Geospatial core: great-circle distance, checkpoint scan validation and
//! territory membership.
//!
//! Everything in this module is synchronous and free of I/O. Callers fetch
//! checkpoints and the territory polygon first and pass them in.

pub mod distance;
pub mod scan;
pub mod territory;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use distance::distance;
pub use scan::{LookupStrategy, Resolution, ScanVerdict};
pub use territory::{
    assess_sample, filter_by_territory, is_inside, BoundaryState, BoundaryTransition, SampleAssessment,
    TerritoryPolygon,
};

/// A position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self { latitude, longitude }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.latitude, point.longitude]
    }
}
