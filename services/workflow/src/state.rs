use std::sync::Arc;

use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use dmrt_auth_types::session::SessionManager;
use sea_orm::DatabaseConnection;

use crate::domain::link::LinkBuilder;
use crate::domain::types::{RateLimitSettings, RoleDirectory};
use crate::infra::cache::RedisRateLimiter;
use crate::infra::db::{DbAuthCodeRepository, DbSubmissionRepository};
use crate::infra::mail::HttpNotifier;
use crate::usecase::authcode::AuthcodeIssuer;
use crate::usecase::rate_limit::RateLimitUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub sessions: SessionManager,
    pub cookie_domain: String,
    pub directory: Arc<RoleDirectory>,
    pub links: LinkBuilder,
    pub notifier: HttpNotifier,
    pub rate_limit: RateLimitSettings,
    pub trust_proxy_headers: bool,
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl AppState {
    pub fn auth_code_repo(&self) -> DbAuthCodeRepository {
        DbAuthCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn submission_repo(&self) -> DbSubmissionRepository {
        DbSubmissionRepository {
            db: self.db.clone(),
        }
    }

    pub fn issuer(&self) -> AuthcodeIssuer<DbAuthCodeRepository> {
        AuthcodeIssuer {
            auth_codes: self.auth_code_repo(),
        }
    }

    pub fn rate_limiter(&self) -> RateLimitUseCase<RedisRateLimiter> {
        RateLimitUseCase {
            limiter: RedisRateLimiter {
                pool: self.redis.clone(),
            },
            settings: self.rate_limit,
        }
    }
}
