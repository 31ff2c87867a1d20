use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use izwi_api::{app, config, middleware};

/// How often pool gauges are refreshed and idle rate-limit keys dropped.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);

    info!("Starting iZwi API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = middleware::init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed, /metrics will be unavailable");
    }

    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let jwt = config.jwt.build()?;
    info!(algorithm = ?jwt.algorithm(), "Session signing configured");

    let addr = config.socket_addr()?;
    let state = app::AppState::new(config, persistence::postgres_stores(pool.clone()), jwt);

    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        loop {
            ticker.tick().await;
            persistence::metrics::record_pool_metrics(&pool);
            if let Some(limiter) = &rate_limiter {
                limiter.prune();
            }
        }
    });

    let app = app::create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
