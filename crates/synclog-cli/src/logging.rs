use tracing_subscriber::{EnvFilter, fmt};

use crate::types::{LogFormat, LogLevel};

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `--log-level`. Everything goes to stderr; stdout carries command output.
pub fn init(level: LogLevel, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    // a subscriber may already be set when `run` is driven more than once in-process
    let _ = match format {
        LogFormat::Text => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
}
