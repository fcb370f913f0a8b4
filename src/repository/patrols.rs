//! Patrol sessions and GPS tracks repository

use sqlx::{Pool, Postgres};

use super::reporter_write_error;
use crate::{
    error::{AppError, AppResult},
    geo::{assess_sample, GeoPoint, SampleAssessment, TerritoryPolygon},
    models::patrol::{ActivePatrol, GpsTrack, PatrolSession, TrackRequest},
};

/// A stored sample with what it meant for the session
#[derive(Debug)]
pub struct RecordedTrack {
    pub session_id: i32,
    pub track: GpsTrack,
    pub total_distance_meters: f64,
    pub assessment: SampleAssessment,
}

#[derive(Clone)]
pub struct PatrolsRepository {
    pool: Pool<Postgres>,
}

impl PatrolsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Active session of a reporter, if any
    pub async fn active_session(&self, user_id: i32) -> AppResult<Option<PatrolSession>> {
        let row = sqlx::query_as::<_, PatrolSession>(
            "SELECT * FROM patrol_sessions WHERE user_id = $1 AND is_active = TRUE LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Open a session. The partial unique index on active sessions turns a
    /// concurrent second start into a conflict.
    pub async fn start_session(&self, user_id: i32) -> AppResult<PatrolSession> {
        sqlx::query_as::<_, PatrolSession>(
            "INSERT INTO patrol_sessions (user_id) VALUES ($1) RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("A patrol session is already active".to_string())
            }
            other => reporter_write_error(other),
        })
    }

    /// Close the active session of a reporter
    pub async fn end_session(&self, user_id: i32) -> AppResult<PatrolSession> {
        sqlx::query_as::<_, PatrolSession>(
            r#"
            UPDATE patrol_sessions
            SET session_end = NOW(), is_active = FALSE
            WHERE user_id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No active patrol session".to_string()))
    }

    /// Store a sample in the caller's active session and add the travelled
    /// leg to the session total. The session row stays locked while the
    /// previous sample is read, so concurrent samples are measured one after
    /// the other. Returns `None` without an active session.
    pub async fn record_track(
        &self,
        user_id: i32,
        sample: &TrackRequest,
        polygon: &TerritoryPolygon,
    ) -> AppResult<Option<RecordedTrack>> {
        let mut tx = self.pool.begin().await?;

        let Some(session) = sqlx::query_as::<_, PatrolSession>(
            "SELECT * FROM patrol_sessions WHERE user_id = $1 AND is_active = TRUE LIMIT 1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let previous = sqlx::query_as::<_, GpsTrack>(
            "SELECT * FROM gps_tracks WHERE session_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(session.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(|t| t.position());

        let assessment = assess_sample(
            previous,
            GeoPoint::new(sample.latitude, sample.longitude),
            polygon,
        );

        let track = sqlx::query_as::<_, GpsTrack>(
            r#"
            INSERT INTO gps_tracks (user_id, session_id, latitude, longitude, accuracy, speed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(session.user_id)
        .bind(session.id)
        .bind(sample.latitude)
        .bind(sample.longitude)
        .bind(sample.accuracy)
        .bind(sample.speed)
        .fetch_one(&mut *tx)
        .await
        .map_err(reporter_write_error)?;

        let total_distance_meters: f64 = sqlx::query_scalar(
            r#"
            UPDATE patrol_sessions
            SET total_distance_meters = total_distance_meters + $2
            WHERE id = $1
            RETURNING total_distance_meters
            "#,
        )
        .bind(session.id)
        .bind(assessment.leg_meters)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(RecordedTrack {
            session_id: session.id,
            track,
            total_distance_meters,
            assessment,
        }))
    }

    /// Latest sample per active session. Sessions without samples are
    /// included with empty coordinates.
    pub async fn active_patrols(&self) -> AppResult<Vec<ActivePatrol>> {
        let rows = sqlx::query_as::<_, ActivePatrol>(
            r#"
            SELECT u.id, u.full_name, u.role,
                   ps.id AS session_id, ps.session_start,
                   g.latitude, g.longitude, g.accuracy, g.speed, g.recorded_at
            FROM patrol_sessions ps
            JOIN users u ON u.id = ps.user_id
            LEFT JOIN LATERAL (
                SELECT latitude, longitude, accuracy, speed, recorded_at
                FROM gps_tracks
                WHERE session_id = ps.id
                ORDER BY id DESC
                LIMIT 1
            ) g ON TRUE
            WHERE ps.is_active = TRUE
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

