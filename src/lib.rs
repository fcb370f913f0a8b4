//! Checkpost patrol check-in server
//!
//! REST JSON API for security staff: geofenced checkpoint scans, patrol
//! sessions with live positions, and the guarded territory boundary.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repository and services over a database pool
    pub fn new(config: AppConfig, pool: sqlx::PgPool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.checkpoints.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
