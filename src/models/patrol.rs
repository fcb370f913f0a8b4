//! Patrol sessions and live position samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::Role;
use crate::geo::{territory::Positioned, BoundaryTransition, GeoPoint};

/// Patrol session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PatrolSession {
    pub id: i32,
    pub user_id: i32,
    pub session_start: DateTime<Utc>,
    pub session_end: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Great-circle length of the recorded track
    pub total_distance_meters: f64,
}

/// Stored position sample
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GpsTrack {
    pub id: i64,
    pub user_id: i32,
    pub session_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl GpsTrack {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Live position report
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TrackRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    /// Horizontal accuracy in meters
    #[validate(range(min = 0.0, message = "Accuracy cannot be negative"))]
    pub accuracy: Option<f64>,
    /// Speed in meters per second
    #[validate(range(min = 0.0, message = "Speed cannot be negative"))]
    pub speed: Option<f64>,
}

/// Result of a live position report
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResult {
    pub track: GpsTrack,
    pub inside_territory: bool,
    /// Set when this sample crossed the boundary
    pub boundary_event: Option<BoundaryTransition>,
    pub session_distance_meters: f64,
}

/// Latest known state of a reporter with an active session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivePatrol {
    pub id: i32,
    pub full_name: String,
    pub role: Role,
    pub session_id: i32,
    pub session_start: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Positioned for ActivePatrol {
    fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Active patrol annotated with territory membership
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivePatrolStatus {
    #[serde(flatten)]
    pub patrol: ActivePatrol,
    pub inside_territory: bool,
}

/// Which active patrols to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatrolScope {
    #[default]
    All,
    Inside,
    Outside,
}

impl PatrolScope {
    pub fn admits(self, inside: bool) -> bool {
        match self {
            PatrolScope::All => true,
            PatrolScope::Inside => inside,
            PatrolScope::Outside => !inside,
        }
    }
}

/// Active patrol filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ActivePatrolQuery {
    pub scope: Option<PatrolScope>,
}
