use anyhow::{Context, Result};
use inventory::{handler::AppRouter, state::AppState};
use shared::{
    config::{Config, ConnectionManager, ConnectionPool},
    utils::{LoggerOptions, Telemetry, init_logger},
};
use std::time::Duration;
use tracing::{error, info};

const SERVICE_NAME: &str = "inventory-api";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = config
        .otel_endpoint
        .as_deref()
        .map(|endpoint| Telemetry::init(SERVICE_NAME, endpoint))
        .transpose()
        .context("Failed to initialize telemetry")?;

    let _log_guard = init_logger(
        telemetry.as_ref().map(Telemetry::logger_provider),
        LoggerOptions {
            component: SERVICE_NAME,
            debug: config.debug,
            enable_file: config.enable_file_log,
        },
    )?;

    info!("🚀 Starting Inventory API initialization...");

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let (state, kafka) = AppState::new(db_pool, &config)
        .await
        .context("Failed to create AppState")?;

    info!("✅ Application setup completed successfully.");

    let served = AppRouter::serve(config.port, state).await;

    info!("🛑 Flushing pending order events...");
    kafka.flush(Duration::from_secs(5));

    if let Some(telemetry) = telemetry
        && let Err(e) = telemetry.shutdown()
    {
        error!("Failed to shutdown telemetry: {e}");
    }

    served
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("📦 Database migrations applied");
    Ok(())
}
