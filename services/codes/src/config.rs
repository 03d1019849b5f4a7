/// Codes service configuration loaded from environment variables.
#[derive(Debug)]
pub struct CodesConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (rate-limit counters).
    pub redis_url: String,
    /// TCP port to listen on (default 3114). Env var: `CODES_PORT`.
    pub codes_port: u16,
    /// Validation attempts allowed per client per window (default 20).
    pub validate_rate_limit: u64,
    /// Redemption attempts allowed per user per window (default 10).
    pub redeem_rate_limit: u64,
    /// Rate-limit window length in seconds (default 60).
    pub rate_limit_window_secs: u64,
}

impl CodesConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            codes_port: env_or("CODES_PORT", 3114),
            validate_rate_limit: env_or("VALIDATE_RATE_LIMIT", 20),
            redeem_rate_limit: env_or("REDEEM_RATE_LIMIT", 10),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", 60),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
