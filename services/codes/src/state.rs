use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::RedisRateLimiter;
use crate::infra::db::{
    DbCodeRepository, DbEntitlementRepository, DbOrganizationRepository, DbRedemptionRepository,
};
use crate::usecase::rate_limit::EnforceRateLimitUseCase;

/// Attempt budgets for the public code endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    /// Validations per client address per window.
    pub validate: u64,
    /// Redemptions per user per window.
    pub redeem: u64,
    pub window_secs: u64,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub rate_limits: RateLimits,
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl AppState {
    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn redemption_repo(&self) -> DbRedemptionRepository {
        DbRedemptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn entitlement_repo(&self) -> DbEntitlementRepository {
        DbEntitlementRepository {
            db: self.db.clone(),
        }
    }

    pub fn organization_repo(&self) -> DbOrganizationRepository {
        DbOrganizationRepository {
            db: self.db.clone(),
        }
    }

    fn rate_limiter(&self) -> RedisRateLimiter {
        RedisRateLimiter {
            pool: self.redis.clone(),
        }
    }

    pub fn validate_limit(&self) -> EnforceRateLimitUseCase<RedisRateLimiter> {
        EnforceRateLimitUseCase {
            limiter: self.rate_limiter(),
            limit: self.rate_limits.validate,
            window_secs: self.rate_limits.window_secs,
        }
    }

    pub fn redeem_limit(&self) -> EnforceRateLimitUseCase<RedisRateLimiter> {
        EnforceRateLimitUseCase {
            limiter: self.rate_limiter(),
            limit: self.rate_limits.redeem,
            window_secs: self.rate_limits.window_secs,
        }
    }
}
