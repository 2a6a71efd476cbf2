use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix of the rolling JSON logs
pub const LOG_FILE_PREFIX: &str = "revisit";

/// Builds the level filter
///
/// `--debug` forces debug output for this crate; otherwise `RUST_LOG` is
/// honored and falls back to `warn`.
pub fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("warn,revisit=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// A stderr-only subscriber for events emitted before [`init_logging`]
///
/// The log directory is part of the configuration, so configuration is
/// resolved under this subscriber via `tracing::subscriber::with_default`.
pub fn stderr_subscriber(debug: bool) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(default_filter(debug))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
}

/// Installs the global subscriber
///
/// Human-readable events go to stderr. When `log_dir` is set, events are
/// also written as JSON lines to a daily rolling file in that directory.
///
/// ### Returns
///
/// The guard flushing the file writer; keep it alive until exit. `None`
/// when file logging is off.
///
/// ### Errors
///
/// Returns an error if the log directory cannot be created or opened.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, InitError> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("json")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    // A subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::registry()
        .with(default_filter(debug))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    Ok(guard)
}
