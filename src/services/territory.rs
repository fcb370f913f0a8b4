//! Territory service: fetch and replace the guarded polygon

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    geo::{territory::MIN_VERTICES, GeoPoint, TerritoryPolygon},
    repository::Repository,
};

/// Decode a stored polygon leniently. Older rows may hold the polygon as a
/// JSON string or carry coordinates as strings; anything that does not parse
/// becomes NaN so the engine skips the affected edges.
pub fn decode_polygon(raw: Value) -> TerritoryPolygon {
    let raw = match raw {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Stored territory is not valid JSON: {}", e);
                return TerritoryPolygon::default();
            }
        },
        other => other,
    };

    let Value::Array(vertices) = raw else {
        tracing::warn!("Stored territory is not an array, ignoring it");
        return TerritoryPolygon::default();
    };

    let coordinate = |value: Option<&Value>| match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };

    let points = vertices
        .iter()
        .map(|vertex| match vertex {
            Value::Array(pair) => GeoPoint::new(coordinate(pair.first()), coordinate(pair.get(1))),
            _ => GeoPoint::new(f64::NAN, f64::NAN),
        })
        .collect();

    TerritoryPolygon::new(points)
}

/// Reject polygons that cannot describe a boundary. An empty polygon is
/// accepted and clears the boundary.
pub fn validate_polygon(polygon: &TerritoryPolygon) -> AppResult<()> {
    if !polygon.is_empty() && polygon.len() < MIN_VERTICES {
        return Err(AppError::Validation(format!(
            "Territory needs at least {} vertices (or none to disable it)",
            MIN_VERTICES
        )));
    }
    if let Some(index) = polygon.vertices().iter().position(|p| !p.is_valid()) {
        return Err(AppError::Validation(format!(
            "Vertex {} is outside valid latitude/longitude ranges",
            index
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct TerritoryService {
    repository: Repository,
}

impl TerritoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Snapshot of the current polygon, empty when none is stored
    pub async fn current(&self) -> AppResult<TerritoryPolygon> {
        Ok(self
            .repository
            .territory
            .get_raw()
            .await?
            .map(decode_polygon)
            .unwrap_or_default())
    }

    /// Replace the polygon wholesale
    pub async fn replace(&self, polygon: TerritoryPolygon) -> AppResult<TerritoryPolygon> {
        validate_polygon(&polygon)?;
        self.repository.territory.save(&polygon).await?;
        tracing::info!(vertices = polygon.len(), active = polygon.is_active(), "Territory replaced");
        Ok(polygon)
    }
}
