//! Checkpoint administration service

use std::future::Future;

use chrono::Utc;
use rand::Rng;

use crate::{
    config::CheckpointsConfig,
    error::{AppError, AppResult},
    models::checkpoint::{Checkpoint, CheckpointCodes, CreateCheckpoint, UpdateCheckpoint},
    repository::Repository,
};

const BASE36: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Random four digit code
fn random_short_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// QR payload: `CP-<unix millis>-<9 base36 chars>`
fn qr_payload(millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9).map(|_| BASE36[rng.gen_range(0..BASE36.len())]).collect();
    format!("CP-{}-{}", millis, suffix)
}

/// Fresh short code and QR payload
fn fresh_codes() -> CheckpointCodes {
    CheckpointCodes {
        short_code: random_short_code(),
        qr_code_data: qr_payload(Utc::now().timestamp_millis()),
    }
}

/// Run `try_insert` with new codes until it stores a row or attempts run out
async fn insert_with_fresh_codes<F, Fut>(attempts: u32, mut try_insert: F) -> AppResult<Checkpoint>
where
    F: FnMut(CheckpointCodes) -> Fut,
    Fut: Future<Output = AppResult<Option<Checkpoint>>>,
{
    for attempt in 1..=attempts {
        let codes = fresh_codes();
        let short_code = codes.short_code.clone();
        if let Some(checkpoint) = try_insert(codes).await? {
            return Ok(checkpoint);
        }
        tracing::debug!(attempt, short_code = %short_code, "Checkpoint code taken, drawing again");
    }
    Err(AppError::Conflict("Could not allocate a free short code".to_string()))
}

#[derive(Clone)]
pub struct CheckpointService {
    repository: Repository,
    config: CheckpointsConfig,
}

impl CheckpointService {
    pub fn new(repository: Repository, config: CheckpointsConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self) -> AppResult<Vec<Checkpoint>> {
        self.repository.checkpoints.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Checkpoint> {
        self.repository.checkpoints.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateCheckpoint) -> AppResult<Checkpoint> {
        let radius = data.radius_meters.unwrap_or(self.config.default_radius_meters);
        self.check_radius(radius)?;

        let checkpoints = &self.repository.checkpoints;
        let checkpoint = insert_with_fresh_codes(self.config.short_code_attempts, |codes| async move {
            checkpoints.create(data, radius, &codes).await
        })
        .await?;
        tracing::info!(
            checkpoint_id = checkpoint.id,
            short_code = %checkpoint.short_code,
            "Checkpoint created"
        );
        Ok(checkpoint)
    }

    pub async fn update(&self, id: i32, data: &UpdateCheckpoint) -> AppResult<Checkpoint> {
        if let Some(radius) = data.radius_meters {
            self.check_radius(radius)?;
        }
        let checkpoint = self.repository.checkpoints.update(id, data).await?;
        tracing::info!(checkpoint_id = id, is_active = checkpoint.is_active, "Checkpoint updated");
        Ok(checkpoint)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.checkpoints.delete(id).await?;
        tracing::info!(checkpoint_id = id, "Checkpoint deleted");
        Ok(())
    }

    fn check_radius(&self, radius: f64) -> AppResult<()> {
        if self.config.radius_in_bounds(radius) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Radius must be between {} and {} meters",
                self.config.min_radius_meters, self.config.max_radius_meters
            )))
        }
    }
}
