use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use sea_orm::DatabaseConnection;

use crate::config::CodesConfig;
use crate::domain::clock::SystemClock;
use crate::domain::code::ThreadRandom;
use crate::infra::db::DbCodeRepository;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// `None` disables every admin endpoint.
    pub admin_token: Option<Arc<str>>,
    pub code_ttl: TimeDelta,
    pub store_timeout: Duration,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &CodesConfig) -> Self {
        Self {
            db,
            admin_token: config.admin_token.as_deref().map(Arc::from),
            code_ttl: config.code_ttl,
            store_timeout: config.store_timeout,
        }
    }

    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
            timeout: self.store_timeout,
        }
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    pub fn rng(&self) -> ThreadRandom {
        ThreadRandom
    }
}
