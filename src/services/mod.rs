//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod redis;
pub mod sessions;

use crate::{
    config::{AuthConfig, SessionConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub sessions: sessions::SessionService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        session_config: SessionConfig,
        redis_service: redis::RedisService,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            sessions: sessions::SessionService::new(redis_service, session_config),
            repository,
        }
    }
}
