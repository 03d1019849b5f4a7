use deadpool_redis::Pool;
use deadpool_redis::redis;

use crate::domain::repository::RateLimiter;
use crate::error::CodesServiceError;

#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

fn rate_limit_key(key: &str) -> String {
    format!("rate_limit:{}", key)
}

/// SET NX opens the window with its TTL and INCR counts the hit, both in one MULTI
/// so a counted key always carries an expiry.
fn window_hit(key: &str, window_secs: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window_secs)
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}

impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, key: &str, window_secs: u64) -> Result<u64, CodesServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CodesServiceError::Internal(e.into()))?;
        let key = rate_limit_key(key);
        let (hits,): (u64,) = window_hit(&key, window_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CodesServiceError::Internal(e.into()))?;
        Ok(hits)
    }
}
