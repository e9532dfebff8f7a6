use crate::config::Config;
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{
        EnvFilter,
        LevelFilter,
    },
    layer::SubscriberExt,
};

/// The prefix for log files, a date is appended
const LOG_FILE_PREFIX: &str = "rtanks-stats.log";

/// Try to setup a logger.
///
/// Logs go to the stderr and to a daily log file in the configured log dir.
/// The returned guard must be held until shutdown, or buffered logs are lost.
pub fn setup(config: &Config) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(config.log_dir())
        .with_context(|| format!("failed to create log dir `{}`", config.log_dir()))?;

    let file_appender = tracing_appender::rolling::daily(config.log_dir(), LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let stderr_formatting_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_formatting_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(file_formatting_layer)
        .with(stderr_formatting_layer);

    tracing::subscriber::set_global_default(subscriber).context("failed to set subscriber")?;

    Ok(guard)
}
