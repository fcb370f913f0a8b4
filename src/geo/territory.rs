//! Territory membership engine.
//!
//! The guarded territory is an open ring of `[lat, lng]` vertices. Containment
//! uses the even-odd rule with latitude in the x role and longitude in the y
//! role; stored polygons use the same pairing and the two must not diverge.
//! Fewer than three vertices means no boundary is configured and every point
//! counts as inside.

use serde::{Deserialize, Serialize};

use super::{distance, GeoPoint};

/// Minimum vertex count for an active boundary
pub const MIN_VERTICES: usize = 3;

/// Ordered polygon vertices. Serialized as `[[lat, lng], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct TerritoryPolygon(Vec<GeoPoint>);

impl TerritoryPolygon {
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this polygon restricts anyone
    pub fn is_active(&self) -> bool {
        self.0.len() >= MIN_VERTICES
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        is_inside(point, &self.0)
    }
}

impl From<Vec<[f64; 2]>> for TerritoryPolygon {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Self(pairs.into_iter().map(GeoPoint::from).collect())
    }
}

impl From<TerritoryPolygon> for Vec<[f64; 2]> {
    fn from(polygon: TerritoryPolygon) -> Self {
        polygon.0.into_iter().map(Into::into).collect()
    }
}

/// Even-odd containment test. Total over any input: degenerate polygons
/// are fail-open and edges with a non-finite endpoint are skipped.
pub fn is_inside(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    let n = polygon.len();
    if n < MIN_VERTICES {
        return true;
    }

    let (x, y) = (point.latitude, point.longitude);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].latitude, polygon[i].longitude);
        let (xj, yj) = (polygon[j].latitude, polygon[j].longitude);
        j = i;

        if !(xi.is_finite() && yi.is_finite() && xj.is_finite() && yj.is_finite()) {
            continue;
        }

        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
    }
    inside
}

/// Anything with an optional last-known position
pub trait Positioned {
    fn position(&self) -> Option<GeoPoint>;
}

/// Pair every reporter with its membership flag. Reporters without a fix
/// are always inside.
pub fn filter_by_territory<T: Positioned>(reporters: Vec<T>, polygon: &TerritoryPolygon) -> Vec<(T, bool)> {
    reporters
        .into_iter()
        .map(|reporter| {
            let inside = reporter.position().map_or(true, |p| polygon.contains(p));
            (reporter, inside)
        })
        .collect()
}

/// Per-reporter membership state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryState {
    Inside,
    Outside,
}

/// A change of [`BoundaryState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryTransition {
    /// Inside -> Outside; raises the alert
    Exited,
    /// Outside -> Inside; clears it
    Entered,
}

impl BoundaryState {
    pub fn from_inside(inside: bool) -> Self {
        if inside {
            BoundaryState::Inside
        } else {
            BoundaryState::Outside
        }
    }

    /// Transition caused by a new sample, if any. A single crossing flips
    /// the state; there is no debounce.
    pub fn next(self, inside: bool) -> (BoundaryState, Option<BoundaryTransition>) {
        let next = BoundaryState::from_inside(inside);
        let transition = match (self, next) {
            (BoundaryState::Inside, BoundaryState::Outside) => Some(BoundaryTransition::Exited),
            (BoundaryState::Outside, BoundaryState::Inside) => Some(BoundaryTransition::Entered),
            _ => None,
        };
        (next, transition)
    }
}

/// What a new sample means relative to the previous one of the same session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleAssessment {
    pub inside: bool,
    /// Great-circle distance from the previous sample
    pub leg_meters: f64,
    pub transition: Option<BoundaryTransition>,
}

/// Evaluate a sample against the previous one and one polygon snapshot.
/// Without a previous sample the reporter starts inside.
pub fn assess_sample(
    previous: Option<GeoPoint>,
    current: GeoPoint,
    polygon: &TerritoryPolygon,
) -> SampleAssessment {
    let state = previous
        .map(|p| BoundaryState::from_inside(polygon.contains(p)))
        .unwrap_or(BoundaryState::Inside);
    let inside = polygon.contains(current);
    let (_, transition) = state.next(inside);

    SampleAssessment {
        inside,
        leg_meters: previous.map_or(0.0, |p| distance(p, current)),
        transition,
    }
}
