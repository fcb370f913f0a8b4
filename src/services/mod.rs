//! Business logic services

pub mod checkpoints;
pub mod patrols;
pub mod scans;
pub mod territory;
pub mod users;

use crate::{config::CheckpointsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub checkpoints: checkpoints::CheckpointService,
    pub scans: scans::ScanService,
    pub patrols: patrols::PatrolService,
    pub territory: territory::TerritoryService,
    pub users: users::UserService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, checkpoints_config: CheckpointsConfig) -> Self {
        let territory = territory::TerritoryService::new(repository.clone());
        Self {
            checkpoints: checkpoints::CheckpointService::new(repository.clone(), checkpoints_config),
            scans: scans::ScanService::new(repository.clone()),
            patrols: patrols::PatrolService::new(repository.clone(), territory.clone()),
            territory,
            users: users::UserService::new(repository.clone()),
            repository,
        }
    }
}
