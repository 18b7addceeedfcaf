//! Anonymous browser sessions, identified by a cookie and stored in Redis

use uuid::Uuid;

use crate::{config::SessionConfig, error::AppResult};

use super::redis::RedisService;

#[derive(Clone)]
pub struct SessionService {
    redis: RedisService,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(redis: RedisService, config: SessionConfig) -> Self {
        Self { redis, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Record one more visit and return how many came before it
    pub async fn record_visit(&self, session_id: Uuid) -> AppResult<i64> {
        let count = self
            .redis
            .incr_with_ttl(&visits_key(session_id), self.config.ttl_seconds)
            .await?;
        Ok(count - 1)
    }
}

/// Reuse the cookie's session id when it is a UUID, otherwise start a new session.
/// The flag is true when a new id was minted.
pub fn resolve_session_id(cookie_value: Option<&str>) -> (Uuid, bool) {
    match cookie_value.and_then(|v| Uuid::parse_str(v).ok()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    }
}

fn visits_key(session_id: Uuid) -> String {
    format!("session:{}:num_visits", session_id)
}
