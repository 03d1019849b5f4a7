use sea_orm::Database;
use tracing::info;

use aiborn_codes::config::CodesConfig;
use aiborn_codes::router::build_router;
use aiborn_codes::state::{AppState, RateLimits};

#[tokio::main]
async fn main() {
    aiborn_core::tracing::init_tracing("info,sqlx=warn");

    let config = CodesConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let state = AppState {
        db,
        redis,
        rate_limits: RateLimits {
            validate: config.validate_rate_limit,
            redeem: config.redeem_rate_limit,
            window_secs: config.rate_limit_window_secs,
        },
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.codes_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("codes service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
