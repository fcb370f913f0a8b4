//! Territory endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, geo::TerritoryPolygon};

use super::AuthenticatedUser;

/// Guarded territory as `[[lat, lng], ...]`. Empty means no boundary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TerritoryBody {
    #[schema(value_type = Vec<Vec<f64>>, example = json!([[41.30, 69.20], [41.31, 69.25], [41.29, 69.27]]))]
    pub polygon: TerritoryPolygon,
}

/// Get the guarded territory
#[utoipa::path(
    get,
    path = "/territory",
    tag = "territory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current territory", body = TerritoryBody),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_territory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<TerritoryBody>> {
    let polygon = state.services.territory.current().await?;
    Ok(Json(TerritoryBody { polygon }))
}

/// Replace the guarded territory
#[utoipa::path(
    put,
    path = "/territory",
    tag = "territory",
    security(("bearer_auth" = [])),
    request_body = TerritoryBody,
    responses(
        (status = 200, description = "Territory replaced", body = TerritoryBody),
        (status = 400, description = "Invalid polygon"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn update_territory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(body): Json<TerritoryBody>,
) -> AppResult<Json<TerritoryBody>> {
    claims.require_admin()?;

    let polygon = state.services.territory.replace(body.polygon).await?;
    Ok(Json(TerritoryBody { polygon }))
}
