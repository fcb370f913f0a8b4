//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{checkpoints, health, patrols, scans, territory, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkpost API",
        version = "1.0.0",
        description = "Patrol checkpoint check-in and territory monitoring REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Checkpoints
        checkpoints::list_checkpoints,
        checkpoints::get_checkpoint,
        checkpoints::create_checkpoint,
        checkpoints::update_checkpoint,
        checkpoints::delete_checkpoint,
        // Scans
        scans::submit_scan,
        scans::list_scans,
        scans::scan_stats,
        // Patrols
        patrols::start_session,
        patrols::end_session,
        patrols::track,
        patrols::active_patrols,
        // Territory
        territory::get_territory,
        territory::update_territory,
        // Staff
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::user_stats,
    ),
    components(
        schemas(
            // Checkpoints
            crate::models::checkpoint::Checkpoint,
            crate::models::checkpoint::CheckpointSummary,
            crate::models::checkpoint::CreateCheckpoint,
            crate::models::checkpoint::UpdateCheckpoint,
            crate::models::enums::CheckpointType,
            crate::models::enums::Role,
            // Scans
            crate::models::scan::Scan,
            crate::models::scan::ScanRequest,
            crate::models::scan::ScanResult,
            crate::models::scan::ScanDetails,
            crate::models::scan::ScanQuery,
            crate::models::scan::ScanStatsQuery,
            crate::models::scan::ScanTotals,
            crate::models::scan::ReporterScanStats,
            crate::models::scan::ScanStats,
            // Patrols
            crate::models::patrol::PatrolSession,
            crate::models::patrol::GpsTrack,
            crate::models::patrol::TrackRequest,
            crate::models::patrol::TrackResult,
            crate::models::patrol::ActivePatrol,
            crate::models::patrol::ActivePatrolStatus,
            crate::models::patrol::PatrolScope,
            crate::geo::BoundaryTransition,
            // Territory
            territory::TerritoryBody,
            // Staff
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UserQuery,
            crate::models::user::UserStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "checkpoints", description = "Checkpoint administration"),
        (name = "scans", description = "Checkpoint scans and history"),
        (name = "patrols", description = "Patrol sessions and live positions"),
        (name = "territory", description = "Guarded territory boundary"),
        (name = "users", description = "Staff administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
