//! Logging and tracing setup for qlens
//!
//! Console output is pretty-printed by default or JSON lines when requested.
//! File output is optional, JSON-formatted and rotated daily. `RUST_LOG`
//! overrides the configured filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LogSettings;

const DEFAULT_FILTER: &str = "info,qlens_server=debug,qlens_session=debug,qlens_analyzer=info,tower_http=info";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for rotated JSON log files; `None` disables file output
    pub log_dir: Option<PathBuf>,

    /// Whether console output is JSON instead of pretty text
    pub json_console: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close events
    pub enable_spans: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            json_console: false,
            include_location: cfg!(debug_assertions),
            enable_spans: false,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Builds the configuration described by the `[logging]` table
    pub fn from_settings(settings: &LogSettings) -> Self {
        let mut config = Self {
            json_console: settings.json,
            enable_spans: settings.spans,
            ..Self::default()
        };
        if settings.file_logs {
            config.log_dir = Some(settings.directory.clone().unwrap_or_else(log_directory));
        }
        if let Some(filter) = &settings.filter {
            config.default_filter = filter.clone();
        }
        config
    }
}

/// Initialize the logging system with the given configuration
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the life of the process.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();

    let console_layer = if config.json_console {
        fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .json()
            .with_current_span(true)
            .with_filter(env_filter.clone())
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_ansi(true)
            .pretty()
            .with_filter(env_filter.clone())
            .boxed()
    };
    layers.push(console_layer);

    let mut guard = None;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "qlens.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::info!(
        log_dir = ?config.log_dir,
        json_console = config.json_console,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Default directory for log files
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qlens")
        .join("logs")
}
