//! Repository layer for database operations

pub mod checkpoints;
pub mod patrols;
pub mod scans;
pub mod territory;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};

pub use scans::ScanStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub checkpoints: checkpoints::CheckpointsRepository,
    pub scans: scans::ScansRepository,
    pub patrols: patrols::PatrolsRepository,
    pub territory: territory::TerritoryRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            checkpoints: checkpoints::CheckpointsRepository::new(pool.clone()),
            scans: scans::ScansRepository::new(pool.clone()),
            patrols: patrols::PatrolsRepository::new(pool.clone()),
            territory: territory::TerritoryRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Error for writes made on behalf of the token holder. A foreign key
/// violation there means the staff member behind a still-valid token is gone.
pub(crate) fn reporter_write_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            AppError::Authentication("Staff member no longer exists".to_string())
        }
        other => AppError::Database(other),
    }
}
