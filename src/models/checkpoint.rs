//! Checkpoint model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::CheckpointType;
use crate::geo::GeoPoint;

/// Checkpoint record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Checkpoint {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Acceptance radius in meters
    pub radius_meters: f64,
    /// Numeric code typed by hand
    pub short_code: String,
    /// Payload encoded in the printed QR sticker
    pub qr_code_data: String,
    pub checkpoint_type: CheckpointType,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Checkpoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Checkpoint summary returned with scan results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckpointSummary {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub checkpoint_type: CheckpointType,
}

impl From<&Checkpoint> for CheckpointSummary {
    fn from(checkpoint: &Checkpoint) -> Self {
        Self {
            id: checkpoint.id,
            name: checkpoint.name.clone(),
            checkpoint_type: checkpoint.checkpoint_type,
        }
    }
}

/// Blank descriptions are stored as NULL
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Create checkpoint request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckpoint {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    /// Defaults to the configured radius when omitted
    pub radius_meters: Option<f64>,
    #[serde(default)]
    pub checkpoint_type: CheckpointType,
}

/// Update checkpoint request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCheckpoint {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    /// An empty string clears the description
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
}

/// Server-generated identifiers for a new checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointCodes {
    pub short_code: String,
    pub qr_code_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation() {
        let valid = CreateCheckpoint {
            name: "Main gate".to_string(),
            description: None,
            latitude: 41.2995,
            longitude: 69.2401,
            radius_meters: None,
            checkpoint_type: CheckpointType::Kpp,
        };
        assert!(valid.validate().is_ok());

        let bad = CreateCheckpoint {
            name: String::new(),
            latitude: 120.0,
            ..valid
        };
        let errors = bad.validate().expect_err("should fail");
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("latitude"));
    }

    #[test]
    fn test_blank_description_clears() {
        let update: UpdateCheckpoint =
            serde_json::from_str(r#"{"description": ""}"#).expect("deserialize");
        assert_eq!(update.description.as_deref().map(non_blank), Some(None));

        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(" North fence "), Some("North fence"));
    }

    #[test]
    fn test_summary_uses_type_key() {
        let summary = CheckpointSummary {
            id: 1,
            name: "East gate".to_string(),
            checkpoint_type: CheckpointType::Kpp,
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["type"], "kpp");
    }
}
