//! Tracing/logging initialization.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::LogFormat;

/// Initialize tracing/logging for the process.
///
/// Filtering follows `RUST_LOG` (default `info`). Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
}
