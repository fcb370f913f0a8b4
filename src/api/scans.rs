//! Checkpoint scan endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::scan::{ScanDetails, ScanQuery, ScanRequest, ScanResult, ScanStats, ScanStatsQuery},
};

use super::AuthenticatedUser;

/// Submit a checkpoint scan. Resolved scans are recorded whether or not they
/// are within range; `is_valid` carries the verdict.
#[utoipa::path(
    post,
    path = "/scans",
    tag = "scans",
    security(("bearer_auth" = [])),
    request_body = ScanRequest,
    responses(
        (status = 201, description = "Scan recorded", body = ScanResult),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Checkpoint code not found or inactive")
    )
)]
pub async fn submit_scan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ScanRequest>,
) -> AppResult<(StatusCode, Json<ScanResult>)> {
    request.validate()?;

    let result = state.services.scans.submit(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Scan history, newest first
#[utoipa::path(
    get,
    path = "/scans",
    tag = "scans",
    security(("bearer_auth" = [])),
    params(ScanQuery),
    responses(
        (status = 200, description = "Scan history", body = Vec<ScanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_scans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ScanQuery>,
) -> AppResult<Json<Vec<ScanDetails>>> {
    let scans = state.services.scans.history(&claims, query).await?;
    Ok(Json(scans))
}

/// Scan statistics over an optional date window
#[utoipa::path(
    get,
    path = "/scans/stats",
    tag = "scans",
    security(("bearer_auth" = [])),
    params(ScanStatsQuery),
    responses(
        (status = 200, description = "Scan statistics", body = ScanStats),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn scan_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ScanStatsQuery>,
) -> AppResult<Json<ScanStats>> {
    claims.require_admin()?;

    let stats = state.services.scans.stats(query).await?;
    Ok(Json(stats))
}
