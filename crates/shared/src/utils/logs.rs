use anyhow::{Result, anyhow};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy)]
pub struct LoggerOptions<'a> {
    pub component: &'a str,
    pub debug: bool,
    pub enable_file: bool,
}

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file logs are lost.
pub fn init_logger(
    sdk_logger_provider: Option<&SdkLoggerProvider>,
    options: LoggerOptions<'_>,
) -> Result<Option<WorkerGuard>> {
    let default_level = if options.debug { "debug" } else { "info" };

    let (file_layer, guard) = if options.enable_file {
        let log_dir = if options.debug { "./logs" } else { "/var/log/app" };
        let file_name = format!("{}.log", options.component);
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
        let (file_writer, guard) = non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .json()
            .with_filter(EnvFilter::new("info"));

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_thread_names(true)
        .with_ansi(options.debug)
        .with_filter(console_filter);

    let otel_layer = sdk_logger_provider.map(|provider| {
        OpenTelemetryTracingBridge::new(provider).with_filter(EnvFilter::new(
            "info,hyper=off,opentelemetry=off,tonic=off,h2=off,reqwest=off",
        ))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
