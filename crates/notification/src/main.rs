use anyhow::{Context, Result};
use notification::app::NotificationApp;
use shared::{
    config::{Config, ConnectionManager},
    utils::{LoggerOptions, Telemetry, init_logger},
};
use tracing::{error, info};

const SERVICE_NAME: &str = "notification-service";

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

    let pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    let app = NotificationApp::new(pool, &config.kafka_broker, config.notification.clone());
    let result = app.run().await;

    if let Some(telemetry) = telemetry
        && let Err(e) = telemetry.shutdown()
    {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Notification service shutdown complete.");
    result
}
