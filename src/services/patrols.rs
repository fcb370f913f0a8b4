//! Patrol sessions, live tracking and territory alerts

use crate::{
    error::{AppError, AppResult},
    geo::{filter_by_territory, BoundaryTransition},
    models::patrol::{ActivePatrolStatus, PatrolScope, PatrolSession, TrackRequest, TrackResult},
    repository::Repository,
};

use super::territory::TerritoryService;

#[derive(Clone)]
pub struct PatrolService {
    repository: Repository,
    territory: TerritoryService,
}

impl PatrolService {
    pub fn new(repository: Repository, territory: TerritoryService) -> Self {
        Self { repository, territory }
    }

    pub async fn start_session(&self, user_id: i32) -> AppResult<PatrolSession> {
        if let Some(existing) = self.repository.patrols.active_session(user_id).await? {
            return Err(AppError::Conflict(format!(
                "Patrol session {} is already active",
                existing.id
            )));
        }
        let session = self.repository.patrols.start_session(user_id).await?;
        tracing::info!(user_id, session_id = session.id, "Patrol session started");
        Ok(session)
    }

    pub async fn end_session(&self, user_id: i32) -> AppResult<PatrolSession> {
        let session = self.repository.patrols.end_session(user_id).await?;
        tracing::info!(
            user_id,
            session_id = session.id,
            distance = session.total_distance_meters,
            "Patrol session ended"
        );
        Ok(session)
    }

    /// Record a live sample in the active session
    pub async fn track(&self, user_id: i32, request: TrackRequest) -> AppResult<TrackResult> {
        let polygon = self.territory.current().await?;
        let recorded = self
            .repository
            .patrols
            .record_track(user_id, &request, &polygon)
            .await?
            .ok_or_else(|| AppError::BusinessRule("No active patrol session".to_string()))?;

        let assessment = recorded.assessment;
        match assessment.transition {
            Some(BoundaryTransition::Exited) => tracing::warn!(
                user_id,
                session_id = recorded.session_id,
                latitude = request.latitude,
                longitude = request.longitude,
                "Reporter left the territory"
            ),
            Some(BoundaryTransition::Entered) => tracing::info!(
                user_id,
                session_id = recorded.session_id,
                "Reporter returned to the territory"
            ),
            None => {}
        }

        Ok(TrackResult {
            track: recorded.track,
            inside_territory: assessment.inside,
            boundary_event: assessment.transition,
            session_distance_meters: recorded.total_distance_meters,
        })
    }

    /// Active patrols with their membership flag, narrowed by scope
    pub async fn active(&self, scope: PatrolScope) -> AppResult<Vec<ActivePatrolStatus>> {
        let patrols = self.repository.patrols.active_patrols().await?;
        let polygon = self.territory.current().await?;

        Ok(filter_by_territory(patrols, &polygon)
            .into_iter()
            .filter(|(_, inside)| scope.admits(*inside))
            .map(|(patrol, inside_territory)| ActivePatrolStatus { patrol, inside_territory })
            .collect())
    }
}
