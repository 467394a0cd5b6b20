//! Logging setup for Herald.
//!
//! Wraps `tracing-subscriber` and `tracing-appender`. The router emits its
//! routing decisions at `debug` and runs each command inside a `dispatch`
//! span, so enabling `span_events.close` is the quickest way to watch
//! commands flow along with their busy time.
//!
//! ```rust,ignore
//! use herald_runtime::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```

use std::ffi::OsStr;
use std::path::Path;

use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file could not be opened.
    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

impl From<&SpanEventConfig> for FmtSpan {
    fn from(config: &SpanEventConfig) -> Self {
        [
            (config.new, FmtSpan::NEW),
            (config.enter, FmtSpan::ENTER),
            (config.exit, FmtSpan::EXIT),
            (config.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |span, (_, event)| span | event)
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        }
    }
}

/// Initializes logging from a [`LoggingConfig`].
///
/// Does nothing if a global subscriber is already installed. Other failures
/// are reported on stderr since no subscriber exists yet to record them.
pub fn init_from_config(config: &LoggingConfig) {
    if let Err(err) = try_init_from_config(config)
        && !matches!(err, LoggingError::Init(_))
    {
        eprintln!("Warning: {err}");
    }
}

/// Installs the global subscriber described by `config`.
pub fn try_init_from_config(config: &LoggingConfig) -> Result<(), LoggingError> {
    let writer = make_writer(config)?;
    tracing_subscriber::registry()
        .with(fmt_layer(config, writer))
        .with(env_filter(config))
        .try_init()?;
    Ok(())
}

/// `RUST_LOG` replaces the configured level; per-module filters apply on top.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    module_directives(config).fold(base, EnvFilter::add_directive)
}

fn module_directives(config: &LoggingConfig) -> impl Iterator<Item = Directive> + '_ {
    config
        .filters
        .iter()
        .filter_map(|(module, level)| format!("{module}={}", level.as_str()).parse().ok())
}

fn fmt_layer(config: &LoggingConfig, writer: BoxMakeWriter) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::from(&config.span_events))
        .with_thread_ids(config.thread_ids)
        .with_file(config.file_location)
        .with_line_number(config.file_location);

    match config.format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Full => layer.boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        #[cfg(feature = "json-log")]
        LogFormat::Json => layer.json().boxed(),
        // Rejected by validation; a hand-built config falls back to full.
        #[cfg(not(feature = "json-log"))]
        LogFormat::Json => layer.boxed(),
    }
}

fn make_writer(config: &LoggingConfig) -> Result<BoxMakeWriter, InitError> {
    Ok(match (config.output, &config.file_path) {
        (LogOutput::Stdout, _) => BoxMakeWriter::new(std::io::stdout),
        (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
        (LogOutput::File, Some(path)) => BoxMakeWriter::new(file_appender(config, path)?),
        (LogOutput::File, None) => {
            eprintln!("Warning: file log output requested without a file path, using stdout");
            BoxMakeWriter::new(std::io::stdout)
        }
    })
}

fn file_appender(config: &LoggingConfig, path: &Path) -> Result<RollingFileAppender, InitError> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().unwrap_or_else(|| OsStr::new("herald.log"));

    RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(file_name.to_string_lossy())
        .max_log_files(config.max_files.max(1) as usize)
        .build(directory)
}
