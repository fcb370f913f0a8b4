//! Checkpoints repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    geo::LookupStrategy,
    models::checkpoint::{non_blank, Checkpoint, CheckpointCodes, CreateCheckpoint, UpdateCheckpoint},
};

/// Unique violations on insert mean a generated code collided
fn unless_code_taken<T>(result: Result<T, sqlx::Error>) -> AppResult<Option<T>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(sqlx::Error::Database(ref db)) if db.is_unique_violation() => Ok(None),
        Err(other) => Err(AppError::Database(other)),
    }
}

#[derive(Clone)]
pub struct CheckpointsRepository {
    pool: Pool<Postgres>,
}

impl CheckpointsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all checkpoints, newest first
    pub async fn list(&self) -> AppResult<Vec<Checkpoint>> {
        let rows = sqlx::query_as::<_, Checkpoint>(
            "SELECT * FROM checkpoints ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get checkpoint by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Checkpoint> {
        sqlx::query_as::<_, Checkpoint>("SELECT * FROM checkpoints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Checkpoint {} not found", id)))
    }

    /// Find a checkpoint, active or not, using one lookup strategy
    pub async fn find_by(&self, strategy: LookupStrategy, code: &str) -> AppResult<Option<Checkpoint>> {
        let query = match strategy {
            LookupStrategy::ShortCode => "SELECT * FROM checkpoints WHERE short_code = $1",
            LookupStrategy::QrPayload => "SELECT * FROM checkpoints WHERE qr_code_data = $1",
        };
        let row = sqlx::query_as::<_, Checkpoint>(query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create checkpoint. Returns `None` when one of the generated codes is
    /// already taken.
    pub async fn create(
        &self,
        data: &CreateCheckpoint,
        radius_meters: f64,
        codes: &CheckpointCodes,
    ) -> AppResult<Option<Checkpoint>> {
        let result = sqlx::query_as::<_, Checkpoint>(
            r#"
            INSERT INTO checkpoints
                (name, description, latitude, longitude, radius_meters, short_code, qr_code_data, checkpoint_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.description.as_deref().and_then(non_blank))
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(radius_meters)
        .bind(&codes.short_code)
        .bind(&codes.qr_code_data)
        .bind(data.checkpoint_type)
        .fetch_one(&self.pool)
        .await;
        unless_code_taken(result)
    }

    /// Partially update a checkpoint
    pub async fn update(&self, id: i32, data: &UpdateCheckpoint) -> AppResult<Checkpoint> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.latitude, "latitude");
        add_field!(data.longitude, "longitude");
        add_field!(data.radius_meters, "radius_meters");
        add_field!(data.is_active, "is_active");

        let query = format!(
            "UPDATE checkpoints SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Checkpoint>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        if let Some(ref description) = data.description {
            builder = builder.bind(non_blank(description));
        }
        bind_field!(data.latitude);
        bind_field!(data.longitude);
        bind_field!(data.radius_meters);
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Checkpoint {} not found", id)))
    }

    /// Delete checkpoint. Scans are never deleted, so a checkpoint that has
    /// any can only be deactivated.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM checkpoints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => AppError::Conflict(
                    format!("Checkpoint {} has recorded scans; deactivate it instead", id),
                ),
                other => AppError::Database(other),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Checkpoint {} not found", id)));
        }
        Ok(())
    }
}
