use tracing::warn;

use crate::domain::repository::RateLimiter;
use crate::error::CodesServiceError;

pub struct EnforceRateLimitUseCase<L: RateLimiter> {
    pub limiter: L,
    pub limit: u64,
    pub window_secs: u64,
}

impl<L: RateLimiter> EnforceRateLimitUseCase<L> {
    /// Count an attempt under `key`; `TooManyAttempts` once the window's limit is passed.
    ///
    /// A failing limiter backend lets the request through.
    pub async fn execute(&self, key: &str) -> Result<(), CodesServiceError> {
        match self.limiter.hit(key, self.window_secs).await {
            Ok(hits) if hits > self.limit => {
                warn!(key, hits, limit = self.limit, "rate limit exceeded");
                Err(CodesServiceError::TooManyAttempts)
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = ?e, key, "rate limiter unavailable");
                Ok(())
            }
        }
    }
}
