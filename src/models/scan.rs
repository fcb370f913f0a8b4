//! Scan record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{checkpoint::CheckpointSummary, enums::CheckpointType, enums::Role};
use crate::geo::GeoPoint;

/// Persisted scan. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Scan {
    pub id: i64,
    pub user_id: i32,
    pub checkpoint_id: i32,
    pub scan_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
    pub is_valid: bool,
    pub notes: Option<String>,
}

/// Scan row ready for insertion. Distance and validity come from the
/// server-side verdict only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub user_id: i32,
    pub checkpoint_id: i32,
    pub position: GeoPoint,
    pub distance_meters: f64,
    pub is_valid: bool,
    pub notes: Option<String>,
}

/// Scan submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanRequest {
    /// Short code or QR payload
    #[validate(length(min = 1, max = 255, message = "Code is required"))]
    pub code: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    pub note: Option<String>,
}

/// Scan result returned to the reporter
#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResult {
    pub scan: Scan,
    pub checkpoint: CheckpointSummary,
    pub distance_meters: f64,
    pub required_radius: f64,
    pub is_valid: bool,
    pub message: String,
}

/// Scan joined with reporter and checkpoint names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScanDetails {
    pub id: i64,
    pub scan_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
    pub is_valid: bool,
    pub notes: Option<String>,
    pub user_id: i32,
    pub user_name: String,
    pub user_role: Role,
    pub checkpoint_id: i32,
    pub checkpoint_name: String,
    pub checkpoint_type: CheckpointType,
}

/// Scan history filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ScanQuery {
    /// Ignored for non-admins, who only see their own scans
    pub user_id: Option<i32>,
    pub checkpoint_id: Option<i32>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Date window for statistics
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ScanStatsQuery {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

/// Aggregate scan counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScanTotals {
    pub total_scans: i64,
    pub active_users: i64,
    pub scanned_checkpoints: i64,
    pub avg_distance: Option<f64>,
    pub valid_scans: i64,
    pub invalid_scans: i64,
}

/// Per-reporter scan counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReporterScanStats {
    pub id: i32,
    pub full_name: String,
    pub role: Role,
    pub scan_count: i64,
    pub last_scan: Option<DateTime<Utc>>,
}

/// Statistics response
#[derive(Debug, Serialize, ToSchema)]
pub struct ScanStats {
    pub stats: ScanTotals,
    pub user_stats: Vec<ReporterScanStats>,
}
