//! Tracing/logging setup shared by binaries.

use core::str::FromStr;

use thiserror::Error;

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Output format for log lines.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// `LOG_FORMAT` held something other than `pretty`/`text`/`json`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log format: {0}")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
