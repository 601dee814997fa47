use ssotoken_common::config::{LogConfig, SsoConfig};
use std::fs;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::error::Result;

const LOG_FILE_NAME: &str = "ssotoken.log";

/// Guard for the non-blocking log writer
///
/// Buffered log lines are flushed when the guard is dropped.
#[derive(Default)]
pub struct ObservabilityGuard {
    log_guard: Option<WorkerGuard>,
}

impl ObservabilityGuard {
    pub fn is_file_backed(&self) -> bool {
        self.log_guard.is_some()
    }
}

/// Initialize logging based on configuration
///
/// A global subscriber that is already installed is left in place.
pub fn init_observability(config: &SsoConfig) -> Result<ObservabilityGuard> {
    let mut guard = ObservabilityGuard::default();
    let observability_config = config.observability_config();

    if config.is_console_logging() {
        init_subscriber_with_writer(std::io::stdout, true, config);
    } else {
        fs::create_dir_all(&observability_config.log.path)?;
        let (non_blocking, worker_guard) =
            build_file_writer(config.log_config(), config.should_rotate_logs())?;
        guard.log_guard = Some(worker_guard);

        init_subscriber_with_writer(non_blocking, false, config);
    }

    tracing::info!(
        "Observability initialized for {} ({}), output={}",
        config.name,
        config.env,
        observability_config.log.output
    );

    Ok(guard)
}

/// Create an EnvFilter from config, with RUST_LOG taking precedence
fn create_env_filter(config: &SsoConfig) -> EnvFilter {
    let directive = config.get_filter_level();

    EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        eprintln!(
            "Failed to parse filter directive: {}. Falling back to default: info",
            directive
        );
        EnvFilter::new("info")
    })
}

fn init_subscriber_with_writer<W>(writer: W, use_ansi: bool, config: &SsoConfig)
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(use_ansi)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(create_env_filter(config))
        .with(fmt_layer)
        .try_init()
        .ok();
}

fn build_file_writer(log_config: &LogConfig, rotate: bool) -> Result<(NonBlocking, WorkerGuard)> {
    if rotate {
        let file_appender = tracing_appender::rolling::daily(&log_config.path, LOG_FILE_NAME);
        Ok(tracing_appender::non_blocking(file_appender))
    } else {
        let log_file_path = std::path::Path::new(&log_config.path).join(LOG_FILE_NAME);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)?;
        Ok(tracing_appender::non_blocking(file))
    }
}
