//! Patrol session and live tracking endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::patrol::{ActivePatrolQuery, ActivePatrolStatus, PatrolSession, TrackRequest, TrackResult},
};

use super::AuthenticatedUser;

/// Start a patrol session for the caller
#[utoipa::path(
    post,
    path = "/patrols/session/start",
    tag = "patrols",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Session started", body = PatrolSession),
        (status = 409, description = "A session is already active")
    )
)]
pub async fn start_session(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<(StatusCode, Json<PatrolSession>)> {
    let session = state.services.patrols.start_session(claims.user_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// End the caller's active patrol session
#[utoipa::path(
    post,
    path = "/patrols/session/end",
    tag = "patrols",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session ended", body = PatrolSession),
        (status = 404, description = "No active session")
    )
)]
pub async fn end_session(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<PatrolSession>> {
    let session = state.services.patrols.end_session(claims.user_id).await?;
    Ok(Json(session))
}

/// Report the caller's current position
#[utoipa::path(
    post,
    path = "/patrols/track",
    tag = "patrols",
    security(("bearer_auth" = [])),
    request_body = TrackRequest,
    responses(
        (status = 201, description = "Position recorded", body = TrackResult),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "No active patrol session")
    )
)]
pub async fn track(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<TrackRequest>,
) -> AppResult<(StatusCode, Json<TrackResult>)> {
    request.validate()?;

    let result = state.services.patrols.track(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Latest position of every active patrol with its territory flag
#[utoipa::path(
    get,
    path = "/patrols/active",
    tag = "patrols",
    security(("bearer_auth" = [])),
    params(ActivePatrolQuery),
    responses(
        (status = 200, description = "Active patrols", body = Vec<ActivePatrolStatus>),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn active_patrols(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ActivePatrolQuery>,
) -> AppResult<Json<Vec<ActivePatrolStatus>>> {
    claims.require_admin()?;

    let patrols = state
        .services
        .patrols
        .active(query.scope.unwrap_or_default())
        .await?;
    Ok(Json(patrols))
}
