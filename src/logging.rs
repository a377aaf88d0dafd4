//! Logging infrastructure using tracing + tracing-subscriber
//!
//! Console output goes to stderr; stdout carries replies. An optional
//! rolling file receives the same events.
//! `RUST_LOG` refines the level per module.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

/// Crates below the client whose handshake and frame chatter is capped at warn
const WEBSOCKET_STACK: [&str; 3] = ["tokio_tungstenite", "tungstenite", "native_tls"];

/// Files smaller than this rotate hourly instead of daily
const HOURLY_BELOW_MB: u64 = 10;

/// Guards that must be held for the lifetime of the application
/// to ensure logs are flushed properly
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Initialize the logging system
///
/// Returns guards that must be kept alive for the duration of the program.
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = determine_level(settings, verbose, quiet);

    let (file_layer, file_guard) = match settings.file {
        Some(ref path) => {
            let log_file = LogFile::new(path, settings.max_file_size_mb, settings.max_files);
            let (writer, guard) = tracing_appender::non_blocking(log_file.appender()?);
            (Some(format_layer(writer, settings.json_format, false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_env_filter(level)?)
        .with(format_layer(std::io::stderr, settings.json_format, true))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        level = %level,
        file = ?settings.file,
        json = settings.json_format,
        "Logging initialized"
    );

    Ok(LogGuards {
        _file_guard: file_guard,
    })
}

/// Logging for commands that never open a connection
pub fn init_simple(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(format_layer(std::io::stderr, false, true))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// `--quiet` beats `-v`, and `-v` beats the configured level
fn determine_level(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => parse_level(&settings.level),
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_env_filter(level: Level) -> Result<EnvFilter> {
    let base = level.to_string().to_lowercase();

    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&base))
        .add_directive(directive(&format!("vidgen_client={}", base))?);
    for target in WEBSOCKET_STACK {
        filter = filter.add_directive(directive(&format!("{}=warn", target))?);
    }

    Ok(filter)
}

fn directive(text: &str) -> Result<Directive> {
    text.parse()
        .map_err(|e| Error::Config(format!("Invalid log directive '{}': {}", text, e)))
}

/// One fmt layer for either sink; terminals get colour and no targets
fn format_layer<S, W>(writer: W, json: bool, terminal: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(terminal && !json);

    if json {
        Box::new(
            layer
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        Box::new(layer.compact().with_target(!terminal))
    }
}

// ─────────────────────────────────────────────────────────────────
// Log File
// ─────────────────────────────────────────────────────────────────

/// Where and how the rolling log file is written.
///
/// `~/.vidgen/logs/client.log` becomes files named
/// `client.<date>.log` in `~/.vidgen/logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogFile {
    directory: PathBuf,
    prefix: String,
    suffix: String,
    hourly: bool,
    keep: usize,
}

impl LogFile {
    fn new(path: &str, max_file_size_mb: u64, max_files: u32) -> Self {
        let path = Path::new(path);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            directory,
            prefix: name_part(path.file_stem(), "client"),
            suffix: name_part(path.extension(), "log"),
            // tracing-appender only rotates on time
            hourly: max_file_size_mb > 0 && max_file_size_mb < HOURLY_BELOW_MB,
            keep: max_files.max(1) as usize,
        }
    }

    fn rotation(&self) -> Rotation {
        if self.hourly {
            Rotation::HOURLY
        } else {
            Rotation::DAILY
        }
    }

    /// Create the directory and open the appender
    fn appender(&self) -> Result<RollingFileAppender> {
        fs::create_dir_all(&self.directory).map_err(|e| Error::IoWrite {
            path: self.directory.clone(),
            source: e,
        })?;

        RollingFileAppender::builder()
            .rotation(self.rotation())
            .filename_prefix(&self.prefix)
            .filename_suffix(&self.suffix)
            .max_log_files(self.keep)
            .build(&self.directory)
            .map_err(|e| Error::Config(format!("Failed to create log file appender: {}", e)))
    }
}

fn name_part(part: Option<&OsStr>, fallback: &str) -> String {
    part.and_then(OsStr::to_str).unwrap_or(fallback).to_string()
}
